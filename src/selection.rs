//! Single-shape selection.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::hit::{self, TextMeasure};
use crate::shape::{Shape, ShapeId};
use crate::viewport::Point;

/// At most one selected shape id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected_id: Option<ShapeId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: impl Into<ShapeId>) {
        self.selected_id = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.selected_id = None;
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// The selected shape, looked up by id. `None` if it no longer exists.
    #[must_use]
    pub fn selected<'a>(&self, shapes: &'a [Shape]) -> Option<&'a Shape> {
        let id = self.selected_id.as_deref()?;
        shapes.iter().find(|s| s.id == id)
    }

    /// Select the topmost shape under `pt`, or clear the selection on a miss.
    ///
    /// Returns the new selection.
    pub fn pick(&mut self, shapes: &[Shape], pt: Point, measure: &dyn TextMeasure) -> Option<&str> {
        self.selected_id = hit::shape_at(shapes, pt, measure).map(|s| s.id.clone());
        self.id()
    }

    /// Remove the selected shape from `shapes` and clear the selection.
    ///
    /// Returns `None` when nothing is selected. History and broadcasting are
    /// the caller's job.
    pub fn delete_selected(&mut self, shapes: &[Shape]) -> Option<Vec<Shape>> {
        let id = self.selected_id.take()?;
        Some(shapes.iter().filter(|s| s.id != id).cloned().collect())
    }
}
