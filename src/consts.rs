//! Shared numeric and style constants for the drawing engine.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed viewport scale.
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed viewport scale.
pub const MAX_SCALE: f64 = 5.0;

/// Scale multiplier applied by a single zoom-in step.
pub const ZOOM_IN_FACTOR: f64 = 1.2;

/// Scale multiplier applied by a single zoom-out step.
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

// ── History ─────────────────────────────────────────────────────

/// Maximum number of snapshots kept on either the undo or the redo stack.
pub const MAX_HISTORY: usize = 50;

// ── Hit-testing ─────────────────────────────────────────────────

/// Distance in world units within which a freehand stroke counts as hit.
pub const FREEHAND_HIT_PX: f64 = 5.0;

// ── Drawing ─────────────────────────────────────────────────────

/// Stroke width for every shape, in world units.
pub const LINE_WIDTH: f64 = 2.0;

/// Font size for text shapes, in world units.
pub const FONT_SIZE: f64 = 20.0;

/// Font family for text shapes.
pub const FONT_FAMILY: &str = "sans-serif";

/// Color given to shapes that arrive without one.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Stroke color of the selection decoration.
pub const SELECTION_COLOR: &str = "#00ff00";

/// Dash segment length of the selection decoration.
pub const SELECTION_DASH: f64 = 5.0;

/// Gap between a selected shape's bounds and its decoration.
pub const SELECTION_PADDING: f64 = 5.0;

/// CSS font string used for both drawing and measuring text.
#[must_use]
pub fn font() -> String {
    format!("{FONT_SIZE}px {FONT_FAMILY}")
}
