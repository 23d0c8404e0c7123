#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{FONT_SIZE, FREEHAND_HIT_PX};
use crate::shape::{Bounds, Geometry, Shape};
use crate::viewport::Point;

/// Measures rendered text width at the fixed text font.
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> f64;
}

/// Width estimate used when no drawing surface is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMeasure;

impl TextMeasure for EstimatedMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * FONT_SIZE * 0.6
    }
}

/// Test whether `pt` (world space) falls on `shape`.
///
/// Diamonds use their bounding box rather than the rhombus.
#[must_use]
pub fn hit_test(shape: &Shape, pt: Point, measure: &dyn TextMeasure) -> bool {
    match &shape.geometry {
        Geometry::Rect { start_x, start_y, width, height } => {
            Bounds::from_extent(*start_x, *start_y, *width, *height).contains(pt)
        }
        Geometry::Circle { center_x, center_y, radius } => {
            (pt.x - center_x).hypot(pt.y - center_y) <= *radius
        }
        Geometry::Diamond { center_x, center_y, width, height } => {
            Bounds::from_extent(center_x - width / 2.0, center_y - height / 2.0, *width, *height).contains(pt)
        }
        Geometry::Text { x, y, content } => {
            !content.is_empty()
                && Bounds { x: *x, y: *y, width: measure.text_width(content), height: FONT_SIZE }.contains(pt)
        }
        Geometry::Freehand { points } => match points.as_slice() {
            [single] => (pt.x - single.x).hypot(pt.y - single.y) <= FREEHAND_HIT_PX,
            _ => points
                .windows(2)
                .any(|seg| distance_to_segment(pt, seg[0], seg[1]) <= FREEHAND_HIT_PX),
        },
    }
}

/// Find the topmost shape under `pt`, scanning in reverse paint order.
#[must_use]
pub fn shape_at<'a>(shapes: &'a [Shape], pt: Point, measure: &dyn TextMeasure) -> Option<&'a Shape> {
    shapes.iter().rev().find(|s| hit_test(s, pt, measure))
}

/// Shortest distance from `pt` to the segment `a`-`b`.
#[must_use]
pub fn distance_to_segment(pt: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-12 {
        return (pt.x - a.x).hypot(pt.y - a.y);
    }
    let t = (((pt.x - a.x) * dx + (pt.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * dx, a.y + t * dy);
    (pt.x - closest.x).hypot(pt.y - closest.y)
}
