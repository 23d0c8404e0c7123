//! Undo/redo history of whole shape-list snapshots.
//!
//! Snapshots are full copies rather than diffs. The top of the undo stack is
//! always the current state, so the stack holds at least one entry once the
//! session is initialized and undo stops at that initial entry.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::consts::MAX_HISTORY;
use crate::shape::Shape;

/// Bounded undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Vec<Shape>>,
    redo_stack: Vec<Vec<Shape>>,
    max_history: usize,
}

impl History {
    /// Create an empty history keeping at most `max_history` entries per stack.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self { undo_stack: Vec::new(), redo_stack: Vec::new(), max_history: max_history.max(1) }
    }

    /// Record the current shape list as the newest state.
    ///
    /// Clears the redo stack and evicts the oldest entry past the cap.
    pub fn snapshot(&mut self, shapes: &[Shape]) {
        self.undo_stack.push(shapes.to_vec());
        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Step back one state, returning the shape list to make live.
    pub fn undo(&mut self) -> Option<Vec<Shape>> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let current = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        if self.redo_stack.len() > self.max_history {
            self.redo_stack.remove(0);
        }
        self.undo_stack.last().cloned()
    }

    /// Step forward one state, returning the shape list to make live.
    pub fn redo(&mut self) -> Option<Vec<Shape>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(next.clone());
        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of entries on the undo stack, including the current state.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop every entry on both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}
