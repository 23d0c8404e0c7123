//! JSON export/import of the canvas and export file naming.
//!
//! The export document is `{"shapes":[...],"viewport":{"scale","offsetX","offsetY"}}`,
//! pretty-printed. Import is all-or-nothing: a payload is either fully valid
//! or rejected without touching any state.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shape::Shape;
use crate::viewport::Viewport;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing or non-array `shapes`")]
    MissingShapes,
    #[error("shape {index} is invalid: {reason}")]
    InvalidShape { index: usize, reason: String },
}

/// The exported canvas document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasExport {
    pub shapes: Vec<Shape>,
    pub viewport: Viewport,
}

impl CanvasExport {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a shape cannot be serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate an export document.
    ///
    /// A missing viewport, or missing/zero viewport fields, fall back to the
    /// identity viewport values; the scale is clamped to the allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] if the text is not JSON, `shapes` is missing or
    /// not an array, or any shape fails to parse or validate.
    pub fn parse(text: &str) -> Result<Self, ImportError> {
        let root: Value = serde_json::from_str(text)?;
        let Some(items) = root.get("shapes").and_then(Value::as_array) else {
            return Err(ImportError::MissingShapes);
        };

        let mut shapes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut shape: Shape = serde_json::from_value(item.clone())
                .map_err(|e| ImportError::InvalidShape { index, reason: e.to_string() })?;
            if !shape.is_valid() {
                return Err(ImportError::InvalidShape { index, reason: "non-finite or empty geometry".into() });
            }
            shape.backfill();
            shapes.push(shape);
        }

        let viewport = root.get("viewport").map_or_else(Viewport::default, viewport_from_value);
        Ok(Self { shapes, viewport })
    }
}

fn viewport_from_value(value: &Value) -> Viewport {
    let field = |key: &str, default: f64| {
        value
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite() && *v != 0.0)
            .unwrap_or(default)
    };
    Viewport { scale: field("scale", 1.0), offset_x: field("offsetX", 0.0), offset_y: field("offsetY", 0.0) }.clamped()
}

/// `canvas-export-<epoch-ms>.json`
#[must_use]
pub fn json_filename(epoch_ms: i64) -> String {
    format!("canvas-export-{epoch_ms}.json")
}

/// `canvas-export-<epoch-ms>.png`
#[must_use]
pub fn png_filename(epoch_ms: i64) -> String {
    format!("canvas-export-{epoch_ms}.png")
}
