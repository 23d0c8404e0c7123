//! Browser binding: canvas surface, WebSocket transport, and the `Engine`
//! wrapper that owns them.
//!
//! The host wires DOM listeners to the `Engine` handlers and drops the engine
//! when the user leaves the room. Everything stateful lives in
//! [`EngineCore`]; this layer only redraws and performs browser side effects
//! for the returned [`Action`]s.

use js_sys::{Array, Date};
use tracing::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement, Url, WebSocket, Window,
};

use crate::config::EngineConfig;
use crate::consts::font;
use crate::engine::{Action, EngineCore, EngineError, TextPrompt};
use crate::export::{ImportError, json_filename, png_filename};
use crate::hit::{EstimatedMeasure, TextMeasure};
use crate::input::{Button, Key, Modifiers, Tool, WheelDelta};
use crate::loader::load_room_shapes;
use crate::render::Surface;
use crate::shape::Shape;
use crate::sync::{RoomId, SyncChannel, SyncError, Transport};
use crate::viewport::{Point, Viewport};

fn dom_err(e: JsValue) -> EngineError {
    EngineError::Dom(format!("{e:?}"))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, EngineError> {
    canvas
        .get_context("2d")
        .map_err(dom_err)?
        .ok_or(EngineError::ContextUnavailable)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| EngineError::ContextUnavailable)
}

#[allow(clippy::cast_possible_truncation)]
fn now_ms() -> i64 {
    Date::now() as i64
}

// =============================================================
// Surface
// =============================================================

/// A 2D canvas context as a drawing [`Surface`].
#[derive(Clone)]
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// # Errors
    ///
    /// Returns [`EngineError::ContextUnavailable`] if the canvas has no 2D context.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, EngineError> {
        Ok(Self { ctx: context_2d(canvas)? })
    }
}

impl TextMeasure for CanvasSurface {
    fn text_width(&self, text: &str) -> f64 {
        self.ctx.set_font(&font());
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(_) => EstimatedMeasure.text_width(text),
        }
    }
}

impl Surface for CanvasSurface {
    type Error = JsValue;

    fn size(&self) -> (f64, f64) {
        self.ctx
            .canvas()
            .map_or((0.0, 0.0), |c| (f64::from(c.width()), f64::from(c.height())))
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn scale(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.ctx.scale(x, y)
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.ctx.translate(x, y)
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.clear_rect(x, y, w, h);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), JsValue> {
        let segments: Array = segments.iter().map(|v| JsValue::from_f64(*v)).collect();
        self.ctx.set_line_dash(&segments)
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ctx.set_text_baseline(baseline);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), JsValue> {
        self.ctx.arc(x, y, radius, start, end)
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.ctx.fill_text(text, x, y)
    }
}

// =============================================================
// Transport / prompt
// =============================================================

impl Transport for WebSocket {
    fn send_text(&self, text: &str) -> Result<(), SyncError> {
        if self.ready_state() != WebSocket::OPEN {
            return Err(SyncError::Closed);
        }
        self.send_with_str(text).map_err(|e| SyncError::Transport(format!("{e:?}")))
    }
}

/// Text content via `window.prompt`.
struct WindowPrompt {
    window: Window,
}

impl TextPrompt for WindowPrompt {
    fn prompt_text(&mut self) -> Option<String> {
        match self.window.prompt_with_message("Enter text:") {
            Ok(text) => text,
            Err(e) => {
                warn!(error = ?e, "engine: text prompt failed");
                None
            }
        }
    }
}

// =============================================================
// Engine
// =============================================================

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas
/// element, its 2D context, and the room socket.
pub struct Engine {
    canvas: HtmlCanvasElement,
    surface: CanvasSurface,
    window: Window,
    pub core: EngineCore,
}

impl Engine {
    /// Bind a session to an open socket and a canvas element.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ContextUnavailable`] if the canvas cannot
    /// provide a 2D context, or [`EngineError::Dom`] outside a browser window.
    pub fn new(
        canvas: HtmlCanvasElement,
        socket: WebSocket,
        room_id: RoomId,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let surface = CanvasSurface::new(&canvas)?;
        let window = web_sys::window().ok_or_else(|| EngineError::Dom("no window".into()))?;
        let core = EngineCore::new(config, SyncChannel::new(room_id, Box::new(socket)))
            .with_measure(Box::new(surface.clone()))
            .with_prompt(Box::new(WindowPrompt { window: window.clone() }));
        Ok(Self { canvas, surface, window, core })
    }

    /// Load persisted shapes and draw the first frame. A failed fetch leaves
    /// an empty canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Render`] if the first frame fails to draw.
    pub async fn initialize(&mut self, client: &reqwest::Client) -> Result<(), EngineError> {
        let shapes = load_room_shapes(client, &self.core.config().http_url, self.core.room_id()).await;
        self.core.initialize(shapes);
        self.render()
    }

    /// Call whenever the socket's readiness changes.
    pub fn on_socket_ready(&mut self, ready: bool) -> bool {
        self.core.on_socket_ready(ready)
    }

    /// Apply one socket text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn handle_message(&mut self, text: &str) -> Result<(), EngineError> {
        let actions = self.core.handle_message(text);
        self.apply(&actions)
    }

    // --- Input events ---

    /// # Errors
    ///
    /// Returns an error if the resulting redraw fails.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.on_pointer_down(screen_pt, button, modifiers);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns an error if the resulting redraw fails.
    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.on_pointer_move(screen_pt, modifiers);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns an error if the resulting redraw fails.
    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.on_pointer_up(screen_pt, button, modifiers);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns an error if the resulting redraw fails.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let actions = self.core.on_wheel(screen_pt, delta, modifiers);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// Keyboard shortcuts. Ignored while an `<input>` or `<textarea>` has focus.
    ///
    /// # Errors
    ///
    /// Returns an error if the redraw or the export download fails.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        self.core.set_text_input_focus(self.text_input_focused());
        let actions = self.core.on_key_down(key, modifiers);
        self.apply(&actions)?;
        Ok(actions)
    }

    // --- Toolbar operations ---

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn set_tool(&mut self, tool: Tool) -> Result<(), EngineError> {
        let actions = self.core.set_tool(tool);
        self.apply(&actions)
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.core.tool()
    }

    pub fn set_color(&mut self, color: &str) {
        self.core.set_color(color);
    }

    #[must_use]
    pub fn color(&self) -> &str {
        self.core.color()
    }

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn undo(&mut self) -> Result<bool, EngineError> {
        self.redraw_if(|core| core.undo())
    }

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn redo(&mut self) -> Result<bool, EngineError> {
        self.redraw_if(|core| core.redo())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.core.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.core.can_redo()
    }

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn zoom_in(&mut self, center: Option<Point>) -> Result<bool, EngineError> {
        self.redraw_if(|core| core.zoom_in(center))
    }

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn zoom_out(&mut self, center: Option<Point>) -> Result<bool, EngineError> {
        self.redraw_if(|core| core.zoom_out(center))
    }

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn reset_zoom(&mut self) -> Result<(), EngineError> {
        self.core.reset_zoom();
        self.render()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.core.viewport()
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        self.core.shapes()
    }

    #[must_use]
    pub fn selected_shape(&self) -> Option<&Shape> {
        self.core.selected_shape()
    }

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn select_shape(&mut self, id: &str) -> Result<bool, EngineError> {
        self.redraw_if(|core| core.select_shape(id))
    }

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn delete_selected(&mut self) -> Result<bool, EngineError> {
        self.redraw_if(EngineCore::delete_selected)
    }

    /// # Errors
    ///
    /// Returns an error if the redraw fails.
    pub fn clear_all(&mut self) -> Result<(), EngineError> {
        self.core.clear_all();
        self.render()
    }

    // --- Export / import ---

    /// Download the JSON export as `canvas-export-<epoch-ms>.json`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Export`] if serialization fails, or
    /// [`EngineError::Dom`] if the download cannot be triggered.
    pub fn download_export(&self) -> Result<(), EngineError> {
        let json = self.core.export_json().map_err(|e| EngineError::Export(e.to_string()))?;
        self.trigger_download(&json, &json_filename(now_ms()))
    }

    /// Pretty JSON export for hosts that handle the file themselves.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Export`] if serialization fails.
    pub fn export_json(&self) -> Result<String, EngineError> {
        self.core.export_json().map_err(|e| EngineError::Export(e.to_string()))
    }

    /// Render the shapes onto a detached canvas of the same size and return
    /// a PNG data URL with its suggested filename.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Dom`] if the offscreen canvas cannot be
    /// created, or [`EngineError::Export`] if drawing or encoding fails.
    pub fn export_png(&self) -> Result<(String, String), EngineError> {
        let document = self.window.document().ok_or_else(|| EngineError::Dom("no document".into()))?;
        let offscreen = document
            .create_element("canvas")
            .map_err(dom_err)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| EngineError::Dom("created element is not a canvas".into()))?;
        offscreen.set_width(self.canvas.width());
        offscreen.set_height(self.canvas.height());

        let mut surface = CanvasSurface::new(&offscreen)?;
        self.core
            .render_export(&mut surface)
            .map_err(|e| EngineError::Export(format!("{e:?}")))?;
        let url = offscreen.to_data_url().map_err(|e| EngineError::Export(format!("{e:?}")))?;
        Ok((url, png_filename(now_ms())))
    }

    /// Replace the canvas from a JSON export and redraw.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] with state untouched when the document is
    /// invalid.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        self.core.import_json(text)?;
        if let Err(e) = self.render() {
            warn!(error = %e, "engine: redraw after import failed");
        }
        Ok(())
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Render`] if a canvas call fails.
    pub fn render(&mut self) -> Result<(), EngineError> {
        self.core
            .render(&mut self.surface)
            .map_err(|e| EngineError::Render(format!("{e:?}")))
    }

    /// End the session. Dropping the engine releases the canvas context and
    /// the socket handle; the host removes its DOM listeners.
    pub fn leave(self) {
        info!(room_id = self.core.room_id(), "engine: session closed");
    }

    // --- Internals ---

    fn apply(&mut self, actions: &[Action]) -> Result<(), EngineError> {
        let mut needs_render = false;
        for action in actions {
            match action {
                Action::RenderNeeded => needs_render = true,
                Action::ExportRequested => self.download_export()?,
                Action::ShapeCommitted(_) | Action::SelectionChanged(_) => {}
            }
        }
        if needs_render { self.render() } else { Ok(()) }
    }

    fn redraw_if(&mut self, op: impl FnOnce(&mut EngineCore) -> bool) -> Result<bool, EngineError> {
        let changed = op(&mut self.core);
        if changed {
            self.render()?;
        }
        Ok(changed)
    }

    fn text_input_focused(&self) -> bool {
        self.window
            .document()
            .and_then(|d| d.active_element())
            .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"))
    }

    fn trigger_download(&self, json: &str, filename: &str) -> Result<(), EngineError> {
        let document = self.window.document().ok_or_else(|| EngineError::Dom("no document".into()))?;
        let parts = Array::of1(&JsValue::from_str(json));
        let options = BlobPropertyBag::new();
        options.set_type("application/json");
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(dom_err)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(dom_err)?;

        let anchor = document
            .create_element("a")
            .map_err(dom_err)?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| EngineError::Dom("created element is not an anchor".into()))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.click();
        Url::revoke_object_url(&url).map_err(dom_err)
    }
}
