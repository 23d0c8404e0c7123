//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture being tracked between pointer-down and
//! pointer-up.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use crate::shape::ShapeId;
use crate::viewport::Point;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pick a shape by clicking it.
    Select,
    /// Draw a rectangle (default).
    #[default]
    Rect,
    /// Draw a circle.
    Circle,
    /// Draw a diamond.
    Diamond,
    /// Place a text label.
    Text,
    /// Draw a freehand stroke.
    Pencil,
    /// Drag to pan the viewport.
    Pan,
}

impl Tool {
    /// Whether this tool creates shapes by dragging out a box.
    #[must_use]
    pub fn is_drag_shape(self) -> bool {
        matches!(self, Self::Rect | Self::Circle | Self::Diamond)
    }

    /// Wire/config name of the tool.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Diamond => "diamond",
            Self::Text => "text",
            Self::Pencil => "pencil",
            Self::Pan => "pan",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tool name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "select" => Ok(Self::Select),
            "rect" => Ok(Self::Rect),
            "circle" => Ok(Self::Circle),
            "diamond" => Ok(Self::Diamond),
            "text" => Ok(Self::Text),
            "pencil" | "freehand" => Ok(Self::Pencil),
            "pan" => Ok(Self::Pan),
            other => Err(UnknownTool(other.to_owned())),
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// The platform shortcut modifier: Ctrl or Meta.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` index.
    #[must_use]
    pub fn from_dom(index: i16) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state read by the toolbar and the renderer.
#[derive(Debug, Clone)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Stroke color applied to new shapes.
    pub color: String,
    /// A text-input element elsewhere on the page has keyboard focus.
    pub text_input_focused: bool,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging out a new shape from an anchor point.
    Drawing {
        /// Tool that started the gesture.
        tool: Tool,
        /// World-space point where the drag started.
        anchor: Point,
    },
    /// Dragging the viewport.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// A freehand stroke is live in the shape list and growing.
    StrokeInProgress {
        /// Id of the stroke being drawn.
        id: ShapeId,
    },
}
