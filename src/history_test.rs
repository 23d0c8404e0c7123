use super::*;
use crate::shape::Geometry;

fn shape(n: usize) -> Shape {
    #[allow(clippy::cast_precision_loss)]
    let x = n as f64;
    Shape {
        id: format!("s{n}"),
        color: "#fff".into(),
        geometry: Geometry::Rect { start_x: x, start_y: x, width: 10.0, height: 10.0 },
    }
}

/// Build a history whose states are `[]`, `[s0]`, `[s0, s1]`, ... with `edits` edits.
fn history_with_edits(edits: usize) -> (History, Vec<Shape>) {
    let mut history = History::default();
    let mut shapes = Vec::new();
    history.snapshot(&shapes);
    for n in 0..edits {
        shapes.push(shape(n));
        history.snapshot(&shapes);
    }
    (history, shapes)
}

// =============================================================
// Initial state
// =============================================================

#[test]
fn new_history_cannot_undo_or_redo() {
    let history = History::default();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn initial_snapshot_is_not_undoable() {
    let mut history = History::default();
    history.snapshot(&[]);
    assert!(!history.can_undo());
    assert!(history.undo().is_none());
    assert_eq!(history.undo_len(), 1);
}

// =============================================================
// undo / redo
// =============================================================

#[test]
fn undo_returns_previous_state() {
    let (mut history, _) = history_with_edits(2);
    let prev = history.undo().unwrap();
    assert_eq!(prev, vec![shape(0)]);
    assert!(history.can_redo());
}

#[test]
fn redo_returns_undone_state() {
    let (mut history, shapes) = history_with_edits(2);
    history.undo();
    let next = history.redo().unwrap();
    assert_eq!(next, shapes);
    assert!(!history.can_redo());
}

#[test]
fn redo_on_empty_stack_is_noop() {
    let (mut history, _) = history_with_edits(1);
    assert!(history.redo().is_none());
    assert_eq!(history.undo_len(), 2);
}

#[test]
fn new_snapshot_clears_redo() {
    let (mut history, mut shapes) = history_with_edits(3);
    history.undo();
    history.undo();
    assert_eq!(history.redo_len(), 2);
    shapes.truncate(1);
    shapes.push(shape(99));
    history.snapshot(&shapes);
    assert!(!history.can_redo());
}

#[test]
fn undo_then_redo_n_times_restores_state() {
    let (mut history, shapes) = history_with_edits(10);
    for _ in 0..10 {
        assert!(history.undo().is_some());
    }
    assert!(!history.can_undo());
    let mut last = Vec::new();
    for _ in 0..10 {
        last = history.redo().unwrap();
    }
    assert_eq!(last, shapes);
}

#[test]
fn undo_stops_at_oldest_state() {
    let (mut history, _) = history_with_edits(3);
    let mut steps = 0;
    while history.undo().is_some() {
        steps += 1;
    }
    assert_eq!(steps, 3);
}

// =============================================================
// Bounds
// =============================================================

#[test]
fn undo_chain_is_capped() {
    let (mut history, _) = history_with_edits(MAX_HISTORY + 25);
    assert_eq!(history.undo_len(), MAX_HISTORY);
    let mut steps = 0;
    while history.undo().is_some() {
        steps += 1;
    }
    assert!(steps < MAX_HISTORY);
    assert_eq!(steps, MAX_HISTORY - 1);
}

#[test]
fn redo_stack_is_capped() {
    let mut history = History::new(3);
    let mut shapes = Vec::new();
    history.snapshot(&shapes);
    for n in 0..3 {
        shapes.push(shape(n));
        history.snapshot(&shapes);
    }
    while history.undo().is_some() {}
    assert!(history.redo_len() <= 3);
}

#[test]
fn snapshot_is_a_copy() {
    let mut history = History::default();
    let mut shapes = vec![shape(0)];
    history.snapshot(&shapes);
    shapes.push(shape(1));
    history.snapshot(&shapes);
    shapes.clear();
    assert_eq!(history.undo().unwrap(), vec![shape(0)]);
}

#[test]
fn clear_empties_both_stacks() {
    let (mut history, _) = history_with_edits(3);
    history.undo();
    history.clear();
    assert_eq!(history.undo_len(), 0);
    assert_eq!(history.redo_len(), 0);
}
