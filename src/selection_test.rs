use super::*;
use crate::hit::EstimatedMeasure;
use crate::shape::Geometry;

fn rect(id: &str, x: f64, y: f64) -> Shape {
    Shape {
        id: id.into(),
        color: "#fff".into(),
        geometry: Geometry::Rect { start_x: x, start_y: y, width: 50.0, height: 50.0 },
    }
}

#[test]
fn new_selection_is_empty() {
    let sel = Selection::new();
    assert!(sel.id().is_none());
    assert!(sel.selected(&[rect("a", 0.0, 0.0)]).is_none());
}

#[test]
fn select_and_lookup() {
    let shapes = vec![rect("a", 0.0, 0.0), rect("b", 100.0, 0.0)];
    let mut sel = Selection::new();
    sel.select("b");
    assert_eq!(sel.id(), Some("b"));
    assert_eq!(sel.selected(&shapes).map(|s| s.id.as_str()), Some("b"));
}

#[test]
fn selected_missing_shape_is_none() {
    let mut sel = Selection::new();
    sel.select("gone");
    assert!(sel.selected(&[rect("a", 0.0, 0.0)]).is_none());
}

#[test]
fn clear_drops_selection() {
    let mut sel = Selection::new();
    sel.select("a");
    sel.clear();
    assert!(sel.id().is_none());
}

#[test]
fn pick_selects_topmost_hit() {
    let shapes = vec![rect("under", 0.0, 0.0), rect("over", 25.0, 25.0)];
    let mut sel = Selection::new();
    assert_eq!(sel.pick(&shapes, Point::new(30.0, 30.0), &EstimatedMeasure), Some("over"));
}

#[test]
fn pick_miss_clears_selection() {
    let shapes = vec![rect("a", 0.0, 0.0)];
    let mut sel = Selection::new();
    sel.select("a");
    assert!(sel.pick(&shapes, Point::new(500.0, 500.0), &EstimatedMeasure).is_none());
    assert!(sel.id().is_none());
}

#[test]
fn delete_selected_filters_and_clears() {
    let shapes = vec![rect("a", 0.0, 0.0), rect("b", 100.0, 0.0)];
    let mut sel = Selection::new();
    sel.select("a");
    let remaining = sel.delete_selected(&shapes).unwrap();
    assert_eq!(remaining, vec![rect("b", 100.0, 0.0)]);
    assert!(sel.id().is_none());
}

#[test]
fn delete_without_selection_is_none() {
    let mut sel = Selection::new();
    assert!(sel.delete_selected(&[rect("a", 0.0, 0.0)]).is_none());
}
