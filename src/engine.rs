//! Session controller: the drawing state machine and the public engine contract.
//!
//! `EngineCore` owns every piece of session state (shape list, viewport,
//! history, selection, gesture) and binds pointer, keyboard, wheel and socket
//! input to it. It never touches the browser; `web::Engine` wraps it with a
//! canvas and a socket.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::export::{CanvasExport, ImportError};
use crate::hit::{EstimatedMeasure, TextMeasure};
use crate::history::History;
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::render::{self, Scene, Surface};
use crate::selection::Selection;
use crate::shape::{Geometry, Shape, ShapeId, create_shape};
use crate::sync::{Inbound, SyncChannel, decode_inbound};
use crate::viewport::{Point, Viewport};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The canvas could not hand out a 2D drawing context.
    #[error("2d drawing context unavailable")]
    ContextUnavailable,
    #[error("render failed: {0}")]
    Render(String),
    #[error("export failed: {0}")]
    Export(String),
    #[error("dom error: {0}")]
    Dom(String),
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The surface must be redrawn.
    RenderNeeded,
    /// A local shape was committed to history and broadcast.
    ShapeCommitted(Shape),
    /// The user asked for a JSON download.
    ExportRequested,
    SelectionChanged(Option<ShapeId>),
}

/// Synchronous source of text content for the text tool.
pub trait TextPrompt {
    /// Ask the user for a label. `None` means cancelled.
    fn prompt_text(&mut self) -> Option<String>;
}

/// Prompt that never yields text; the text tool becomes inert.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl TextPrompt for NoPrompt {
    fn prompt_text(&mut self) -> Option<String> {
        None
    }
}

/// Core engine state. All logic that doesn't depend on the canvas element.
pub struct EngineCore {
    shapes: Vec<Shape>,
    viewport: Viewport,
    history: History,
    selection: Selection,
    ui: UiState,
    input: InputState,
    preview: Option<Shape>,
    sync: SyncChannel,
    measure: Box<dyn TextMeasure>,
    prompt: Box<dyn TextPrompt>,
    config: EngineConfig,
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EngineConfig, sync: SyncChannel) -> Self {
        let ui = UiState {
            tool: config.initial_tool,
            color: config.default_color.clone(),
            text_input_focused: false,
        };
        Self {
            shapes: Vec::new(),
            viewport: Viewport::default(),
            history: History::default(),
            selection: Selection::new(),
            ui,
            input: InputState::Idle,
            preview: None,
            sync,
            measure: Box::new(EstimatedMeasure),
            prompt: Box::new(NoPrompt),
            config,
        }
    }

    /// Replace the text width source used for hit-testing and bounds.
    #[must_use]
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: Box<dyn TextPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    // =============================================================
    // Session lifecycle
    // =============================================================

    /// Hydrate the session with persisted shapes and record the initial
    /// history entry.
    pub fn initialize(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
        self.selection.clear();
        self.input = InputState::Idle;
        self.preview = None;
        self.history.clear();
        self.history.snapshot(&self.shapes);
        debug!(count = self.shapes.len(), room_id = self.sync.room_id(), "engine: initialized");
    }

    /// Forward socket readiness to the join guard.
    pub fn on_socket_ready(&mut self, ready: bool) -> bool {
        self.sync.join(ready)
    }

    /// Apply one inbound wire message.
    ///
    /// Peer shapes bypass history. A shape whose id is already present
    /// replaces it in place; otherwise it is appended.
    pub fn handle_message(&mut self, text: &str) -> Vec<Action> {
        match decode_inbound(text) {
            Ok(Inbound::Shape(shape)) => {
                match self.shapes.iter_mut().find(|s| s.id == shape.id) {
                    Some(existing) => *existing = shape,
                    None => self.shapes.push(shape),
                }
                vec![Action::RenderNeeded]
            }
            Ok(Inbound::Ignored(kind)) => {
                debug!(kind = %kind, "sync: ignored message type");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "sync: dropped malformed inbound message");
                Vec::new()
            }
        }
    }

    // =============================================================
    // Tool / color
    // =============================================================

    /// Switch tools. Clears the selection and abandons any gesture; a live
    /// freehand stroke is committed as drawn so far.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = self.abandon_gesture();
        self.ui.tool = tool;
        if self.selection.id().is_some() {
            self.selection.clear();
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.ui.color = color.into();
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.ui.color
    }

    /// Record whether a text input elsewhere on the page has focus.
    pub fn set_text_input_focus(&mut self, focused: bool) {
        self.ui.text_input_focused = focused;
    }

    // =============================================================
    // History
    // =============================================================

    pub fn undo(&mut self) -> bool {
        let Some(shapes) = self.history.undo() else {
            return false;
        };
        self.shapes = shapes;
        self.prune_selection();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(shapes) = self.history.redo() else {
            return false;
        };
        self.shapes = shapes;
        self.prune_selection();
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // =============================================================
    // Selection
    // =============================================================

    /// Select a shape by id. Returns `false` if no such shape exists.
    pub fn select_shape(&mut self, id: &str) -> bool {
        if self.shapes.iter().any(|s| s.id == id) {
            self.selection.select(id);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selection.selected(&self.shapes)
    }

    /// Delete the selected shape, snapshot, and re-broadcast the list.
    pub fn delete_selected(&mut self) -> bool {
        if self.selected_shape().is_none() {
            self.selection.clear();
            return false;
        }
        let Some(remaining) = self.selection.delete_selected(&self.shapes) else {
            return false;
        };
        self.shapes = remaining;
        self.history.snapshot(&self.shapes);
        self.sync.broadcast_shapes(&self.shapes);
        true
    }

    // =============================================================
    // Viewport
    // =============================================================

    pub fn zoom_in(&mut self, center: Option<Point>) -> bool {
        self.viewport.zoom_in(center)
    }

    pub fn zoom_out(&mut self, center: Option<Point>) -> bool {
        self.viewport.zoom_out(center)
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
    }

    /// Pan by a world-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    // =============================================================
    // Shape list
    // =============================================================

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Empty the canvas as an undoable edit.
    ///
    /// Peers are sent the (empty) list; the wire has no delete message, so
    /// their copies are unaffected.
    pub fn clear_all(&mut self) {
        self.abandon_gesture();
        self.shapes.clear();
        self.selection.clear();
        self.history.snapshot(&self.shapes);
        self.sync.broadcast_shapes(&self.shapes);
    }

    // =============================================================
    // Export / import
    // =============================================================

    /// Pretty-printed JSON of the shapes and viewport.
    ///
    /// # Errors
    ///
    /// Returns an error if a shape cannot be serialized.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        CanvasExport { shapes: self.shapes.clone(), viewport: self.viewport }.to_json()
    }

    /// Replace shapes and viewport from an export document.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] and leaves every piece of state untouched when
    /// the document is invalid.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        let doc = CanvasExport::parse(text).map_err(|e| {
            warn!(error = %e, "engine: import rejected");
            e
        })?;
        self.abandon_gesture();
        self.shapes = doc.shapes;
        self.viewport = doc.viewport;
        self.selection.clear();
        self.history.snapshot(&self.shapes);
        self.sync.broadcast_shapes(&self.shapes);
        Ok(())
    }

    // =============================================================
    // Input events
    // =============================================================

    /// Start a gesture. A gesture still open because its pointer-up never
    /// arrived is closed first, exactly as a tool change would close it.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = self.abandon_gesture();
        actions.extend(self.begin_gesture(screen_pt, button, modifiers));
        actions
    }

    fn begin_gesture(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);

        if self.ui.tool == Tool::Select {
            let picked = self.selection.pick(&self.shapes, world, self.measure.as_ref()).map(str::to_owned);
            return vec![Action::SelectionChanged(picked), Action::RenderNeeded];
        }

        let pan_trigger = button == Button::Middle
            || (button == Button::Primary && modifiers.command())
            || (button == Button::Primary && self.ui.tool == Tool::Pan);
        if pan_trigger {
            self.input = InputState::Panning { last_screen: screen_pt };
            return Vec::new();
        }
        if button != Button::Primary {
            return Vec::new();
        }

        match self.ui.tool {
            Tool::Text => self.place_text(world),
            Tool::Pencil => {
                let Some(stroke) = create_shape(Tool::Pencil, world, world, &self.ui.color) else {
                    return Vec::new();
                };
                self.input = InputState::StrokeInProgress { id: stroke.id.clone() };
                self.shapes.push(stroke);
                vec![Action::RenderNeeded]
            }
            tool if tool.is_drag_shape() => {
                self.input = InputState::Drawing { tool, anchor: world };
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);
        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                let dx = (screen_pt.x - last_screen.x) / self.viewport.scale;
                let dy = (screen_pt.y - last_screen.y) / self.viewport.scale;
                *last_screen = screen_pt;
                self.viewport.pan(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::Drawing { tool, anchor } => {
                self.preview = create_shape(*tool, *anchor, world, &self.ui.color);
                vec![Action::RenderNeeded]
            }
            InputState::StrokeInProgress { id } => {
                let Some(stroke) = self.shapes.iter_mut().find(|s| s.id == *id) else {
                    return Vec::new();
                };
                if let Geometry::Freehand { points } = &mut stroke.geometry {
                    points.push(world);
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => Vec::new(),
            InputState::Drawing { tool, anchor } => {
                self.preview = None;
                match create_shape(tool, anchor, world, &self.ui.color) {
                    Some(shape) => self.commit(shape),
                    None => vec![Action::RenderNeeded],
                }
            }
            InputState::StrokeInProgress { id } => self.finish_stroke(&id),
        }
    }

    /// Scroll up zooms in, scroll down zooms out, both around the pointer.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        let changed = if delta.dy < 0.0 {
            self.viewport.zoom_in(Some(screen_pt))
        } else if delta.dy > 0.0 {
            self.viewport.zoom_out(Some(screen_pt))
        } else {
            false
        };
        if changed { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if self.ui.text_input_focused {
            return Vec::new();
        }

        if modifiers.command() {
            let changed = match key.0.to_ascii_lowercase().as_str() {
                "z" if modifiers.shift => self.redo(),
                "z" => self.undo(),
                "y" => self.redo(),
                "s" => return vec![Action::ExportRequested],
                "0" => {
                    self.reset_zoom();
                    true
                }
                _ => false,
            };
            return if changed { vec![Action::RenderNeeded] } else { Vec::new() };
        }

        match key.0.as_str() {
            "Delete" | "Backspace" => {
                if self.delete_selected() {
                    vec![Action::SelectionChanged(None), Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            "Escape" => {
                self.selection.clear();
                vec![Action::SelectionChanged(None), Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    // =============================================================
    // Render
    // =============================================================

    /// Draw the live scene: shapes, preview, and selection decoration.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let scene = Scene {
            shapes: &self.shapes,
            viewport: &self.viewport,
            selected: self.selection.selected(&self.shapes),
            preview: self.preview.as_ref(),
        };
        render::render(surface, &scene)
    }

    /// Draw the shapes for raster export on an opaque background.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn render_export<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        render::render_export(surface, &self.shapes, &self.viewport, &self.config.export_background)
    }

    // --- Queries ---

    #[must_use]
    pub fn preview(&self) -> Option<&Shape> {
        self.preview.as_ref()
    }

    #[must_use]
    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn room_id(&self) -> crate::sync::RoomId {
        self.sync.room_id()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Internals ---

    fn place_text(&mut self, world: Point) -> Vec<Action> {
        let Some(content) = self.prompt.prompt_text() else {
            return Vec::new();
        };
        if content.is_empty() {
            return Vec::new();
        }
        let shape = Shape::new(self.ui.color.clone(), Geometry::Text { x: world.x, y: world.y, content });
        self.commit(shape)
    }

    fn commit(&mut self, shape: Shape) -> Vec<Action> {
        self.shapes.push(shape.clone());
        self.history.snapshot(&self.shapes);
        self.sync.broadcast_shape(&shape);
        vec![Action::ShapeCommitted(shape), Action::RenderNeeded]
    }

    fn finish_stroke(&mut self, id: &str) -> Vec<Action> {
        let Some(stroke) = self.shapes.iter().find(|s| s.id == id).cloned() else {
            return vec![Action::RenderNeeded];
        };
        self.history.snapshot(&self.shapes);
        self.sync.broadcast_shape(&stroke);
        vec![Action::ShapeCommitted(stroke), Action::RenderNeeded]
    }

    fn abandon_gesture(&mut self) -> Vec<Action> {
        self.preview = None;
        match std::mem::take(&mut self.input) {
            InputState::StrokeInProgress { id } => self.finish_stroke(&id),
            _ => Vec::new(),
        }
    }

    fn prune_selection(&mut self) {
        if self.selection.id().is_some() && self.selection.selected(&self.shapes).is_none() {
            self.selection.clear();
        }
    }
}
