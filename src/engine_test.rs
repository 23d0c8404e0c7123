#![allow(clippy::float_cmp)]

use futures::channel::mpsc::{self, UnboundedReceiver};
use serde_json::{Value, json};

use super::*;
use crate::consts::{MAX_HISTORY, MAX_SCALE, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use crate::sync::RoomId;

// =============================================================
// Helpers
// =============================================================

struct FixedPrompt(Option<String>);

impl TextPrompt for FixedPrompt {
    fn prompt_text(&mut self) -> Option<String> {
        self.0.clone()
    }
}

fn core_in_room(room_id: RoomId) -> (EngineCore, UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded::<String>();
    let mut core = EngineCore::new(EngineConfig::default(), SyncChannel::new(room_id, Box::new(tx)));
    core.initialize(Vec::new());
    (core, rx)
}

fn core() -> (EngineCore, UnboundedReceiver<String>) {
    core_in_room(1)
}

fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(Some(text)) = rx.try_next() {
        out.push(serde_json::from_str(&text).unwrap());
    }
    out
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn ctrl_modifier() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn drag(core: &mut EngineCore, from: Point, to: Point) -> Vec<Action> {
    core.on_pointer_down(from, Button::Primary, no_modifiers());
    core.on_pointer_move(to, no_modifiers());
    core.on_pointer_up(to, Button::Primary, no_modifiers())
}

fn rect_shape(id: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape {
        id: id.into(),
        color: "#fff".into(),
        geometry: Geometry::Rect { start_x: x, start_y: y, width: w, height: h },
    }
}

fn chat_for(shape: &Shape, room_id: RoomId) -> String {
    json!({ "type": "chat", "message": serde_json::to_string(shape).unwrap(), "roomId": room_id }).to_string()
}

// =============================================================
// Construction / lifecycle
// =============================================================

#[test]
fn new_core_uses_config_tool_and_color() {
    let (tx, _rx) = mpsc::unbounded::<String>();
    let config = EngineConfig { initial_tool: Tool::Pencil, default_color: "#123456".into(), ..Default::default() };
    let core = EngineCore::new(config, SyncChannel::new(3, Box::new(tx)));
    assert_eq!(core.tool(), Tool::Pencil);
    assert_eq!(core.color(), "#123456");
    assert_eq!(core.room_id(), 3);
    assert_eq!(*core.input_state(), InputState::Idle);
}

#[test]
fn initialize_loads_shapes_without_undo() {
    let (mut core, _rx) = core();
    core.initialize(vec![rect_shape("a", 0.0, 0.0, 1.0, 1.0)]);
    assert_eq!(core.shapes().len(), 1);
    assert!(!core.can_undo());
    assert!(!core.can_redo());
}

#[test]
fn socket_ready_joins_exactly_once() {
    let (mut core, mut rx) = core_in_room(9);
    assert!(!core.on_socket_ready(false));
    assert!(core.on_socket_ready(true));
    assert!(!core.on_socket_ready(true));
    assert_eq!(drain(&mut rx), vec![json!({ "type": "join_room", "roomId": 9 })]);
}

// =============================================================
// Drawing
// =============================================================

#[test]
fn rect_drag_commits_one_shape_and_one_chat() {
    let (mut core, mut rx) = core_in_room(5);
    let actions = drag(&mut core, pt(10.0, 10.0), pt(110.0, 60.0));

    assert_eq!(core.shapes().len(), 1);
    let shape = core.shapes()[0].clone();
    assert_eq!(shape.geometry, Geometry::Rect { start_x: 10.0, start_y: 10.0, width: 100.0, height: 50.0 });
    assert!(core.can_undo());
    assert!(actions.contains(&Action::ShapeCommitted(shape.clone())));

    let sent = drain(&mut rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["type"], "chat");
    assert_eq!(sent[0]["roomId"], 5);
    let embedded: Shape = serde_json::from_str(sent[0]["message"].as_str().unwrap()).unwrap();
    assert_eq!(embedded, shape);

    let (mut peer, _peer_rx) = core_in_room(5);
    peer.handle_message(&serde_json::to_string(&sent[0]).unwrap());
    assert_eq!(peer.shapes(), core.shapes());
}

#[test]
fn drag_shows_preview_without_touching_model() {
    let (mut core, mut rx) = core();
    core.set_tool(Tool::Circle);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    assert!(matches!(core.input_state(), InputState::Drawing { tool: Tool::Circle, .. }));

    let actions = core.on_pointer_move(pt(6.0, 8.0), no_modifiers());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(core.shapes().is_empty());
    let preview = core.preview().unwrap();
    assert_eq!(preview.geometry, Geometry::Circle { center_x: 3.0, center_y: 4.0, radius: 5.0 });
    assert!(drain(&mut rx).is_empty());

    core.on_pointer_up(pt(6.0, 8.0), Button::Primary, no_modifiers());
    assert!(core.preview().is_none());
    assert_eq!(core.shapes().len(), 1);
    assert_eq!(*core.input_state(), InputState::Idle);
}

#[test]
fn drawing_maps_through_viewport() {
    let (mut core, _rx) = core();
    core.viewport = Viewport { scale: 2.0, offset_x: 5.0, offset_y: 0.0 };
    drag(&mut core, pt(20.0, 20.0), pt(40.0, 60.0));
    assert_eq!(
        core.shapes()[0].geometry,
        Geometry::Rect { start_x: 5.0, start_y: 10.0, width: 10.0, height: 20.0 }
    );
}

#[test]
fn new_shapes_use_current_color() {
    let (mut core, _rx) = core();
    core.set_color("#ff0000");
    core.set_tool(Tool::Diamond);
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 4.0));
    assert_eq!(core.shapes()[0].color, "#ff0000");
    assert!(matches!(core.shapes()[0].geometry, Geometry::Diamond { .. }));
}

#[test]
fn secondary_button_does_nothing() {
    let (mut core, _rx) = core();
    assert!(core.on_pointer_down(pt(0.0, 0.0), Button::Secondary, no_modifiers()).is_empty());
    assert_eq!(*core.input_state(), InputState::Idle);
}

#[test]
fn pencil_stroke_grows_then_commits_on_release() {
    let (mut core, mut rx) = core();
    core.set_tool(Tool::Pencil);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    assert_eq!(core.shapes().len(), 1);
    assert!(matches!(core.input_state(), InputState::StrokeInProgress { .. }));

    core.on_pointer_move(pt(5.0, 5.0), no_modifiers());
    core.on_pointer_move(pt(10.0, 0.0), no_modifiers());
    assert!(core.preview().is_none());
    assert!(!core.can_undo());
    assert!(drain(&mut rx).is_empty());

    let actions = core.on_pointer_up(pt(10.0, 0.0), Button::Primary, no_modifiers());
    let Geometry::Freehand { points } = &core.shapes()[0].geometry else {
        unreachable!("expected a freehand stroke");
    };
    assert_eq!(points, &vec![pt(0.0, 0.0), pt(5.0, 5.0), pt(10.0, 0.0)]);
    assert!(core.can_undo());
    assert!(matches!(actions[0], Action::ShapeCommitted(_)));

    let sent = drain(&mut rx);
    assert_eq!(sent.len(), 1);
    let message: Value = serde_json::from_str(sent[0]["message"].as_str().unwrap()).unwrap();
    assert_eq!(message["type"], "pencil");
}

#[test]
fn text_tool_commits_prompted_content() {
    let (tx, mut rx) = mpsc::unbounded::<String>();
    let mut core = EngineCore::new(EngineConfig::default(), SyncChannel::new(1, Box::new(tx)))
        .with_prompt(Box::new(FixedPrompt(Some("hello".into()))));
    core.initialize(Vec::new());
    core.set_tool(Tool::Text);

    core.on_pointer_down(pt(30.0, 40.0), Button::Primary, no_modifiers());
    assert_eq!(
        core.shapes()[0].geometry,
        Geometry::Text { x: 30.0, y: 40.0, content: "hello".into() }
    );
    assert_eq!(*core.input_state(), InputState::Idle);
    assert!(core.can_undo());
    assert_eq!(drain(&mut rx).len(), 1);
}

#[test]
fn text_tool_ignores_cancel_and_empty() {
    for answer in [None, Some(String::new())] {
        let (tx, _rx) = mpsc::unbounded::<String>();
        let mut core = EngineCore::new(EngineConfig::default(), SyncChannel::new(1, Box::new(tx)))
            .with_prompt(Box::new(FixedPrompt(answer)));
        core.initialize(Vec::new());
        core.set_tool(Tool::Text);
        assert!(core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers()).is_empty());
        assert!(core.shapes().is_empty());
    }
}

#[test]
fn default_prompt_makes_text_tool_inert() {
    let (mut core, _rx) = core();
    core.set_tool(Tool::Text);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    assert!(core.shapes().is_empty());
}

// =============================================================
// Panning
// =============================================================

#[test]
fn middle_button_pans_by_scaled_delta() {
    let (mut core, _rx) = core();
    core.viewport = Viewport { scale: 2.0, offset_x: 0.0, offset_y: 0.0 };
    core.on_pointer_down(pt(100.0, 100.0), Button::Middle, no_modifiers());
    assert_eq!(*core.input_state(), InputState::Panning { last_screen: pt(100.0, 100.0) });

    core.on_pointer_move(pt(120.0, 90.0), no_modifiers());
    core.on_pointer_move(pt(140.0, 90.0), no_modifiers());
    assert_eq!(core.viewport().offset_x, 20.0);
    assert_eq!(core.viewport().offset_y, -5.0);

    core.on_pointer_up(pt(140.0, 90.0), Button::Middle, no_modifiers());
    assert_eq!(*core.input_state(), InputState::Idle);
    assert!(core.shapes().is_empty());
    assert!(!core.can_undo());
}

#[test]
fn command_click_pans_instead_of_drawing() {
    let (mut core, _rx) = core();
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, ctrl_modifier());
    core.on_pointer_move(pt(30.0, 0.0), ctrl_modifier());
    core.on_pointer_up(pt(30.0, 0.0), Button::Primary, ctrl_modifier());
    assert!(core.shapes().is_empty());
    assert_eq!(core.viewport().offset_x, 30.0);
}

#[test]
fn pan_tool_pans_with_primary_button() {
    let (mut core, _rx) = core();
    core.set_tool(Tool::Pan);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(0.0, 12.0), no_modifiers());
    assert_eq!(core.viewport().offset_y, 12.0);
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_tool_picks_topmost_and_clears_on_miss() {
    let (mut core, _rx) = core();
    core.initialize(vec![rect_shape("below", 0.0, 0.0, 100.0, 100.0), rect_shape("above", 50.0, 50.0, 100.0, 100.0)]);
    core.set_tool(Tool::Select);

    let actions = core.on_pointer_down(pt(75.0, 75.0), Button::Primary, no_modifiers());
    assert_eq!(actions[0], Action::SelectionChanged(Some("above".into())));
    assert_eq!(core.selected_shape().unwrap().id, "above");
    assert_eq!(*core.input_state(), InputState::Idle);

    core.on_pointer_down(pt(500.0, 500.0), Button::Primary, no_modifiers());
    assert!(core.selected_shape().is_none());
}

#[test]
fn changing_tool_clears_selection() {
    let (mut core, _rx) = core();
    core.initialize(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0)]);
    assert!(core.select_shape("a"));
    let actions = core.set_tool(Tool::Rect);
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.selected_shape().is_none());
}

#[test]
fn select_shape_rejects_unknown_id() {
    let (mut core, _rx) = core();
    assert!(!core.select_shape("ghost"));
    assert!(core.selected_shape().is_none());
}

#[test]
fn delete_key_removes_selection_and_rebroadcasts() {
    let (mut core, mut rx) = core();
    core.initialize(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0), rect_shape("b", 20.0, 0.0, 10.0, 10.0)]);
    core.select_shape("a");

    let actions = core.on_key_down(&Key::new("Delete"), no_modifiers());
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert_eq!(core.shapes().len(), 1);
    assert_eq!(core.shapes()[0].id, "b");
    assert!(core.selected_shape().is_none());
    assert!(core.can_undo());

    let sent = drain(&mut rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["type"], "chat");

    assert!(core.undo());
    assert_eq!(core.shapes().len(), 2);
}

#[test]
fn backspace_without_selection_is_noop() {
    let (mut core, _rx) = core();
    core.initialize(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0)]);
    assert!(core.on_key_down(&Key::new("Backspace"), no_modifiers()).is_empty());
    assert_eq!(core.shapes().len(), 1);
    assert!(!core.can_undo());
}

#[test]
fn escape_clears_selection() {
    let (mut core, _rx) = core();
    core.initialize(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0)]);
    core.select_shape("a");
    core.on_key_down(&Key::new("Escape"), no_modifiers());
    assert!(core.selected_shape().is_none());
}

#[test]
fn undo_past_selected_shape_drops_selection() {
    let (mut core, _rx) = core();
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));
    let id = core.shapes()[0].id.clone();
    core.select_shape(&id);
    assert!(core.undo());
    assert!(core.selected_shape().is_none());
    assert!(core.selection.id().is_none());
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn shortcuts_drive_history_zoom_and_export() {
    let (mut core, _rx) = core();
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));

    assert_eq!(core.on_key_down(&Key::new("z"), ctrl_modifier()), vec![Action::RenderNeeded]);
    assert!(core.shapes().is_empty());

    let redo_shift = Modifiers { meta: true, shift: true, ..Default::default() };
    core.on_key_down(&Key::new("Z"), redo_shift);
    assert_eq!(core.shapes().len(), 1);

    core.on_key_down(&Key::new("z"), ctrl_modifier());
    core.on_key_down(&Key::new("y"), ctrl_modifier());
    assert_eq!(core.shapes().len(), 1);

    assert_eq!(core.on_key_down(&Key::new("s"), ctrl_modifier()), vec![Action::ExportRequested]);

    core.zoom_in(None);
    core.pan(3.0, 4.0);
    core.on_key_down(&Key::new("0"), ctrl_modifier());
    assert_eq!(core.viewport(), Viewport::default());
}

#[test]
fn undo_at_boundary_reports_nothing() {
    let (mut core, _rx) = core();
    assert!(core.on_key_down(&Key::new("z"), ctrl_modifier()).is_empty());
    assert!(!core.undo());
    assert!(!core.redo());
}

#[test]
fn keyboard_suppressed_while_text_input_focused() {
    let (mut core, _rx) = core();
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));
    core.set_text_input_focus(true);
    assert!(core.on_key_down(&Key::new("z"), ctrl_modifier()).is_empty());
    assert_eq!(core.shapes().len(), 1);
    core.set_text_input_focus(false);
    core.on_key_down(&Key::new("z"), ctrl_modifier());
    assert!(core.shapes().is_empty());
}

// =============================================================
// Wheel
// =============================================================

#[test]
fn wheel_zooms_around_pointer() {
    let (mut core, _rx) = core();
    let cursor = pt(200.0, 150.0);
    let before = core.viewport().screen_to_world(cursor);

    assert_eq!(core.on_wheel(cursor, WheelDelta { dx: 0.0, dy: -100.0 }, no_modifiers()), vec![Action::RenderNeeded]);
    assert_eq!(core.viewport().scale, ZOOM_IN_FACTOR);
    let after = core.viewport().screen_to_world(cursor);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);

    core.reset_zoom();
    core.on_wheel(cursor, WheelDelta { dx: 0.0, dy: 100.0 }, no_modifiers());
    assert_eq!(core.viewport().scale, ZOOM_OUT_FACTOR);
}

#[test]
fn wheel_at_zoom_limit_needs_no_render() {
    let (mut core, _rx) = core();
    while core.zoom_in(None) {}
    assert_eq!(core.viewport().scale, MAX_SCALE);
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: -1.0 }, no_modifiers()).is_empty());
}

// =============================================================
// Inbound sync
// =============================================================

#[test]
fn remote_shapes_do_not_touch_history() {
    let (mut core, _rx) = core();
    let undo_before = core.can_undo();
    core.handle_message(&chat_for(&rect_shape("r1", 0.0, 0.0, 5.0, 5.0), 1));
    assert_eq!(core.shapes().len(), 1);
    assert_eq!(core.can_undo(), undo_before);

    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));
    let undo_before = core.can_undo();
    core.handle_message(&chat_for(&rect_shape("r2", 0.0, 0.0, 5.0, 5.0), 1));
    assert_eq!(core.can_undo(), undo_before);
}

#[test]
fn remote_shape_with_known_id_replaces_in_place() {
    let (mut core, _rx) = core();
    core.initialize(vec![rect_shape("a", 0.0, 0.0, 1.0, 1.0), rect_shape("b", 0.0, 0.0, 1.0, 1.0)]);
    core.handle_message(&chat_for(&rect_shape("a", 9.0, 9.0, 2.0, 2.0), 1));
    assert_eq!(core.shapes().len(), 2);
    assert_eq!(core.shapes()[0], rect_shape("a", 9.0, 9.0, 2.0, 2.0));
}

#[test]
fn remote_shape_missing_id_and_color_is_backfilled() {
    let (mut core, _rx) = core();
    let msg = json!({
        "type": "chat",
        "message": r#"{"type":"circle","centerX":0,"centerY":0,"radius":10}"#,
        "roomId": 1,
    });
    core.handle_message(&msg.to_string());
    assert!(!core.shapes()[0].id.is_empty());
    assert!(!core.shapes()[0].color.is_empty());
}

#[test]
fn remote_shape_with_invalid_geometry_is_dropped() {
    let (mut core, _rx) = core();
    let msg = json!({
        "type": "chat",
        "message": r#"{"id":"neg","type":"circle","centerX":0,"centerY":0,"radius":-5}"#,
        "roomId": 1,
    });
    assert!(core.handle_message(&msg.to_string()).is_empty());
    assert!(core.shapes().is_empty());
}

#[test]
fn malformed_and_foreign_messages_are_dropped() {
    let (mut core, _rx) = core();
    assert!(core.handle_message("not json").is_empty());
    assert!(core.handle_message(r#"{"type":"chat","message":"{oops","roomId":1}"#).is_empty());
    assert!(core.handle_message(r#"{"type":"user_joined","userId":"x"}"#).is_empty());
    assert!(core.shapes().is_empty());
}

// =============================================================
// History laws
// =============================================================

#[test]
fn undo_then_redo_restores_state() {
    let (mut core, _rx) = core();
    for i in 0..5 {
        let x = f64::from(i) * 20.0;
        drag(&mut core, pt(x, 0.0), pt(x + 10.0, 10.0));
    }
    let before = core.shapes().to_vec();
    for _ in 0..5 {
        assert!(core.undo());
    }
    assert!(core.shapes().is_empty());
    for _ in 0..5 {
        assert!(core.redo());
    }
    assert_eq!(core.shapes(), before.as_slice());
}

#[test]
fn undo_chain_is_bounded() {
    let (mut core, _rx) = core();
    for i in 0..(MAX_HISTORY + 10) {
        #[allow(clippy::cast_precision_loss)]
        let x = i as f64;
        drag(&mut core, pt(x, 0.0), pt(x + 1.0, 1.0));
    }
    let mut steps = 0;
    while core.undo() {
        steps += 1;
    }
    assert_eq!(steps, MAX_HISTORY - 1);
    assert_eq!(core.shapes().len(), 11);
}

#[test]
fn new_edit_clears_redo() {
    let (mut core, _rx) = core();
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));
    core.undo();
    assert!(core.can_redo());
    drag(&mut core, pt(0.0, 0.0), pt(5.0, 5.0));
    assert!(!core.can_redo());
}

// =============================================================
// Gesture abandonment
// =============================================================

#[test]
fn tool_change_mid_drag_drops_preview() {
    let (mut core, _rx) = core();
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(10.0, 10.0), no_modifiers());
    assert!(core.preview().is_some());
    core.set_tool(Tool::Circle);
    assert!(core.preview().is_none());
    assert_eq!(*core.input_state(), InputState::Idle);
    assert!(core.shapes().is_empty());
}

#[test]
fn pointer_down_after_lost_release_commits_open_stroke() {
    let (mut core, mut rx) = core();
    core.set_tool(Tool::Pencil);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(4.0, 4.0), no_modifiers());

    let actions = core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    assert!(matches!(actions[0], Action::ShapeCommitted(_)));
    core.on_pointer_move(pt(60.0, 60.0), no_modifiers());
    core.on_pointer_up(pt(60.0, 60.0), Button::Primary, no_modifiers());

    assert_eq!(core.shapes().len(), 2);
    assert_eq!(drain(&mut rx).len(), 2);
    assert!(core.undo());
    assert_eq!(core.shapes().len(), 1);
    assert!(core.undo());
    assert!(core.shapes().is_empty());
}

#[test]
fn pointer_down_after_lost_release_drops_stale_preview() {
    let (mut core, mut rx) = core();
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(10.0, 10.0), no_modifiers());
    core.on_pointer_down(pt(100.0, 100.0), Button::Primary, no_modifiers());
    assert!(core.preview().is_none());
    assert_eq!(*core.input_state(), InputState::Drawing { tool: Tool::Rect, anchor: pt(100.0, 100.0) });
    assert!(core.shapes().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn tool_change_mid_stroke_commits_stroke() {
    let (mut core, mut rx) = core();
    core.set_tool(Tool::Pencil);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(4.0, 4.0), no_modifiers());
    let actions = core.set_tool(Tool::Rect);
    assert!(matches!(actions[0], Action::ShapeCommitted(_)));
    assert!(core.can_undo());
    assert_eq!(drain(&mut rx).len(), 1);
    assert!(core.on_pointer_up(pt(4.0, 4.0), Button::Primary, no_modifiers()).is_empty());
}

// =============================================================
// Clear / export / import
// =============================================================

#[test]
fn clear_all_is_undoable() {
    let (mut core, _rx) = core();
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));
    core.clear_all();
    assert!(core.shapes().is_empty());
    assert!(core.undo());
    assert_eq!(core.shapes().len(), 1);
}

#[test]
fn export_then_import_restores_shapes_and_viewport() {
    let (mut core, _rx) = core();
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));
    core.zoom_in(Some(pt(50.0, 50.0)));
    let exported = core.export_json().unwrap();
    let shapes = core.shapes().to_vec();
    let viewport = core.viewport();

    let (mut other, mut rx) = core_in_room(2);
    other.import_json(&exported).unwrap();
    assert_eq!(other.shapes(), shapes.as_slice());
    assert_eq!(other.viewport(), viewport);
    assert!(other.can_undo());
    assert_eq!(drain(&mut rx).len(), 1);
}

#[test]
fn failed_import_leaves_state_untouched() {
    let (mut core, mut rx) = core();
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));
    drain(&mut rx);
    let shapes = core.shapes().to_vec();

    assert!(matches!(core.import_json(r#"{"viewport":{}}"#), Err(ImportError::MissingShapes)));
    assert!(core.import_json("nope").is_err());
    assert_eq!(core.shapes(), shapes.as_slice());
    assert!(!core.can_redo());
    assert!(drain(&mut rx).is_empty());
}
