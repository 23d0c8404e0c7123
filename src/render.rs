//! Rendering: draws the scene onto a 2D drawing surface.
//!
//! This module only talks to the [`Surface`] trait, which mirrors the subset
//! of `CanvasRenderingContext2d` the engine needs. The browser context
//! implements it in [`crate::web`]; tests use a recording surface. Renderers
//! read shape and viewport state and never mutate it.
//!
//! Fallible surface calls propagate the surface's own error type.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use crate::consts::{font, LINE_WIDTH, SELECTION_COLOR, SELECTION_DASH, SELECTION_PADDING};
use crate::hit::TextMeasure;
use crate::shape::{Geometry, Shape};
use crate::viewport::Viewport;

/// A 2D drawing target.
pub trait Surface: TextMeasure {
    type Error;

    /// Surface size in device pixels.
    fn size(&self) -> (f64, f64);

    fn save(&mut self);
    fn restore(&mut self);
    fn scale(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), Self::Error>;
    fn set_font(&mut self, font: &str);
    fn set_text_baseline(&mut self, baseline: &str);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), Self::Error>;
    fn close_path(&mut self);
    fn stroke(&mut self);
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;
}

/// Everything one frame draws.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Committed shapes in paint order.
    pub shapes: &'a [Shape],
    pub viewport: &'a Viewport,
    /// Shape to decorate with the selection box.
    pub selected: Option<&'a Shape>,
    /// Live drag feedback; never part of `shapes`.
    pub preview: Option<&'a Shape>,
}

/// Draw the full scene: clear, shapes, preview, selection decoration.
///
/// The context state is restored even when a draw call fails, so a bad frame
/// never leaks its transform into the next one.
///
/// # Errors
///
/// Returns `Err` if any fallible surface call fails.
pub fn render<S: Surface>(surface: &mut S, scene: &Scene<'_>) -> Result<(), S::Error> {
    let (w, h) = surface.size();
    surface.clear_rect(0.0, 0.0, w, h);

    surface.save();
    let result = draw_scene(surface, scene);
    surface.restore();
    result
}

fn draw_scene<S: Surface>(surface: &mut S, scene: &Scene<'_>) -> Result<(), S::Error> {
    apply_viewport(surface, scene.viewport)?;
    for shape in scene.shapes {
        draw_shape(surface, shape)?;
    }
    if let Some(preview) = scene.preview {
        draw_shape(surface, preview)?;
    }
    if let Some(selected) = scene.selected {
        draw_selection(surface, selected)?;
    }
    Ok(())
}

/// Draw shapes for raster export: opaque background, no UI decoration.
///
/// # Errors
///
/// Returns `Err` if any fallible surface call fails.
pub fn render_export<S: Surface>(
    surface: &mut S,
    shapes: &[Shape],
    viewport: &Viewport,
    background: &str,
) -> Result<(), S::Error> {
    let (w, h) = surface.size();
    surface.set_fill_style(background);
    surface.fill_rect(0.0, 0.0, w, h);

    surface.save();
    let scene = Scene { shapes, viewport, selected: None, preview: None };
    let result = draw_scene(surface, &scene);
    surface.restore();
    result
}

fn apply_viewport<S: Surface>(surface: &mut S, viewport: &Viewport) -> Result<(), S::Error> {
    surface.scale(viewport.scale, viewport.scale)?;
    surface.translate(viewport.offset_x, viewport.offset_y)
}

// =============================================================
// Shapes
// =============================================================

/// Draw one shape in world coordinates.
///
/// # Errors
///
/// Returns `Err` if any fallible surface call fails.
pub fn draw_shape<S: Surface>(surface: &mut S, shape: &Shape) -> Result<(), S::Error> {
    surface.set_stroke_style(&shape.color);
    surface.set_line_width(LINE_WIDTH);

    match &shape.geometry {
        Geometry::Rect { start_x, start_y, width, height } => {
            surface.stroke_rect(*start_x, *start_y, *width, *height);
        }
        Geometry::Circle { center_x, center_y, radius } => {
            surface.begin_path();
            surface.arc(*center_x, *center_y, *radius, 0.0, 2.0 * PI)?;
            surface.stroke();
        }
        Geometry::Diamond { center_x, center_y, width, height } => {
            let hw = width / 2.0;
            let hh = height / 2.0;
            surface.begin_path();
            surface.move_to(*center_x, center_y - hh); // top
            surface.line_to(center_x + hw, *center_y); // right
            surface.line_to(*center_x, center_y + hh); // bottom
            surface.line_to(center_x - hw, *center_y); // left
            surface.close_path();
            surface.stroke();
        }
        Geometry::Text { x, y, content } => {
            if content.is_empty() {
                return Ok(());
            }
            surface.set_fill_style(&shape.color);
            surface.set_font(&font());
            surface.set_text_baseline("top");
            surface.fill_text(content, *x, *y)?;
        }
        Geometry::Freehand { points } => {
            let [first, rest @ ..] = points.as_slice() else {
                return Ok(());
            };
            if rest.is_empty() {
                return Ok(());
            }
            surface.begin_path();
            surface.move_to(first.x, first.y);
            for p in rest {
                surface.line_to(p.x, p.y);
            }
            surface.stroke();
        }
    }
    Ok(())
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection<S: Surface>(surface: &mut S, shape: &Shape) -> Result<(), S::Error> {
    let Some(bounds) = shape.bounds(&*surface) else {
        return Ok(());
    };

    surface.set_stroke_style(SELECTION_COLOR);
    surface.set_line_width(LINE_WIDTH);
    surface.set_line_dash(&[SELECTION_DASH, SELECTION_DASH])?;
    surface.stroke_rect(
        bounds.x - SELECTION_PADDING,
        bounds.y - SELECTION_PADDING,
        bounds.width + SELECTION_PADDING * 2.0,
        bounds.height + SELECTION_PADDING * 2.0,
    );
    surface.set_line_dash(&[])
}
