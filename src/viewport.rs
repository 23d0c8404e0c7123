//! Pan/zoom viewport and screen/world coordinate conversion.
//!
//! The transform is applied as `scale` then `translate(offset)`, so a screen
//! point maps to world space as `screen / scale - offset`.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SCALE, MIN_SCALE, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport state for pan/zoom on the infinite canvas.
///
/// `scale` is kept within `[MIN_SCALE, MAX_SCALE]`. The offsets are in world
/// units and serialize as `offsetX` / `offsetY`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f64,
    #[serde(rename = "offsetX")]
    pub offset_x: f64,
    #[serde(rename = "offsetY")]
    pub offset_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0, offset_x: 0.0, offset_y: 0.0 }
    }
}

impl Viewport {
    /// Convert a screen-space point (relative to the surface's top-left) to
    /// world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: screen.x / self.scale - self.offset_x,
            y: screen.y / self.scale - self.offset_y,
        }
    }

    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: (world.x + self.offset_x) * self.scale,
            y: (world.y + self.offset_y) * self.scale,
        }
    }

    /// Multiply the scale by `factor`, clamped to the allowed range.
    ///
    /// With a `center` (in screen space) the offset is adjusted so the world
    /// point under `center` stays under it. Returns `false` when the clamped
    /// scale did not change or `factor` is not a finite positive number.
    pub fn zoom(&mut self, factor: f64, center: Option<Point>) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let old_scale = self.scale;
        let new_scale = (old_scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - old_scale).abs() < f64::EPSILON {
            return false;
        }
        self.scale = new_scale;

        if let Some(p) = center {
            self.offset_x += p.x / new_scale - p.x / old_scale;
            self.offset_y += p.y / new_scale - p.y / old_scale;
        }
        true
    }

    pub fn zoom_in(&mut self, center: Option<Point>) -> bool {
        self.zoom(ZOOM_IN_FACTOR, center)
    }

    pub fn zoom_out(&mut self, center: Option<Point>) -> bool {
        self.zoom(ZOOM_OUT_FACTOR, center)
    }

    /// Accumulate a world-space offset. Screen deltas must already be divided
    /// by the current scale.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Restore scale 1 and zero offset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Return a copy with the scale forced into the allowed range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self { scale: self.scale.clamp(MIN_SCALE, MAX_SCALE), ..self }
    }
}
