//! Shape model: drawable primitives, their wire format, and geometry helpers.
//!
//! Every shape shares one id space and carries a stroke color. The geometry
//! is a tagged union serialized inline next to the common fields, so a rect
//! travels as `{"id":..,"color":..,"type":"rect","startX":..,...}`.
//!
//! Rect width/height may be negative; they are stored as drawn and only
//! canonicalized by [`Bounds`] when rendering decorations or hit-testing.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_COLOR, FONT_SIZE};
use crate::hit::TextMeasure;
use crate::input::Tool;
use crate::viewport::Point;

/// Unique identifier for a shape.
pub type ShapeId = String;

/// Generate a fresh shape id.
#[must_use]
pub fn new_shape_id() -> ShapeId {
    Uuid::new_v4().to_string()
}

/// A drawable shape as stored in the model and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Opaque unique id. Empty only transiently, before [`Shape::backfill`].
    #[serde(default)]
    pub id: ShapeId,
    /// Stroke (and text fill) color as a CSS color string.
    #[serde(default)]
    pub color: String,
    #[serde(flatten)]
    pub geometry: Geometry,
}

/// Per-kind geometry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    /// Rectangle from an origin corner; extent may be negative.
    #[serde(rename_all = "camelCase")]
    Rect { start_x: f64, start_y: f64, width: f64, height: f64 },
    #[serde(rename_all = "camelCase")]
    Circle { center_x: f64, center_y: f64, radius: f64 },
    /// Rhombus through the edge midpoints of a `width` x `height` box.
    #[serde(rename_all = "camelCase")]
    Diamond { center_x: f64, center_y: f64, width: f64, height: f64 },
    /// Text anchored at its top-left corner.
    Text {
        x: f64,
        y: f64,
        #[serde(default)]
        content: String,
    },
    /// Pencil stroke; grows point by point while it is being drawn.
    #[serde(rename = "pencil", alias = "freehand")]
    Freehand { points: Vec<Point> },
}

/// Axis-aligned bounding box with non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Build canonical bounds from an origin and a possibly negative extent.
    #[must_use]
    pub fn from_extent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: x.min(x + width),
            y: y.min(y + height),
            width: width.abs(),
            height: height.abs(),
        }
    }

    /// Whether `pt` lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }
}

impl Shape {
    #[must_use]
    pub fn new(color: impl Into<String>, geometry: Geometry) -> Self {
        Self { id: new_shape_id(), color: color.into(), geometry }
    }

    /// Fill in a missing id or color so records from older clients remain
    /// renderable.
    pub fn backfill(&mut self) {
        if self.id.is_empty() {
            self.id = new_shape_id();
        }
        if self.color.is_empty() {
            self.color = DEFAULT_COLOR.to_owned();
        }
    }

    /// Structural validity: finite coordinates, non-negative radius, at least
    /// one freehand point.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match &self.geometry {
            Geometry::Rect { start_x, start_y, width, height } => {
                [start_x, start_y, width, height].iter().all(|v| v.is_finite())
            }
            Geometry::Circle { center_x, center_y, radius } => {
                center_x.is_finite() && center_y.is_finite() && radius.is_finite() && *radius >= 0.0
            }
            Geometry::Diamond { center_x, center_y, width, height } => {
                [center_x, center_y, width, height].iter().all(|v| v.is_finite())
            }
            Geometry::Text { x, y, .. } => x.is_finite() && y.is_finite(),
            Geometry::Freehand { points } => {
                !points.is_empty() && points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            }
        }
    }

    /// Bounding box used for the selection decoration.
    ///
    /// Returns `None` for text without content and for a stroke without points.
    #[must_use]
    pub fn bounds(&self, measure: &dyn TextMeasure) -> Option<Bounds> {
        match &self.geometry {
            Geometry::Rect { start_x, start_y, width, height } => {
                Some(Bounds::from_extent(*start_x, *start_y, *width, *height))
            }
            Geometry::Circle { center_x, center_y, radius } => Some(Bounds {
                x: center_x - radius,
                y: center_y - radius,
                width: radius * 2.0,
                height: radius * 2.0,
            }),
            Geometry::Diamond { center_x, center_y, width, height } => Some(Bounds::from_extent(
                center_x - width / 2.0,
                center_y - height / 2.0,
                *width,
                *height,
            )),
            Geometry::Text { x, y, content } => {
                if content.is_empty() {
                    return None;
                }
                Some(Bounds { x: *x, y: *y, width: measure.text_width(content), height: FONT_SIZE })
            }
            Geometry::Freehand { points } => {
                let first = points.first()?;
                let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
                for p in &points[1..] {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                Some(Bounds { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y })
            }
        }
    }
}

/// Derive a shape from a drag between `start` and `end` with the given tool.
///
/// Text starts with empty content and freehand is seeded with `start` alone;
/// callers grow them afterwards. Tools that do not draw (`select`, `pan`)
/// produce nothing.
#[must_use]
pub fn create_shape(tool: Tool, start: Point, end: Point, color: &str) -> Option<Shape> {
    let geometry = match tool {
        Tool::Rect => Geometry::Rect {
            start_x: start.x,
            start_y: start.y,
            width: end.x - start.x,
            height: end.y - start.y,
        },
        Tool::Circle => Geometry::Circle {
            center_x: (start.x + end.x) / 2.0,
            center_y: (start.y + end.y) / 2.0,
            radius: (end.x - start.x).hypot(end.y - start.y) / 2.0,
        },
        Tool::Diamond => Geometry::Diamond {
            center_x: (start.x + end.x) / 2.0,
            center_y: (start.y + end.y) / 2.0,
            width: (end.x - start.x).abs(),
            height: (end.y - start.y).abs(),
        },
        Tool::Text => Geometry::Text { x: start.x, y: start.y, content: String::new() },
        Tool::Pencil => Geometry::Freehand { points: vec![start] },
        Tool::Select | Tool::Pan => return None,
    };
    Some(Shape::new(color, geometry))
}
