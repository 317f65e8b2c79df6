use super::*;
use crate::foundation::core::{Point, Vec2};

#[test]
fn set_selection_resets_geometry() {
    let mut s = Selection::new();
    s.set_selection(Rect::new(10.0, 10.0, 0.0, 0.0));
    let st = s.state();
    assert!(st.something_selected);
    assert_eq!(st.selection, Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(st.temp_transformed, st.selection);
    assert_eq!(st.transform, Affine::IDENTITY);

    s.set_selection(Rect::ZERO);
    assert!(!s.something_selected());
}

#[test]
fn moving_temp_rect_yields_translation() {
    let mut s = Selection::new();
    s.set_selection(Rect::new(0.0, 0.0, 10.0, 10.0));
    s.set_temp_transformed(Rect::new(10.0, 0.0, 20.0, 10.0));
    assert!(s.is_transforming());
    assert_eq!(s.transform().translation(), Vec2::new(10.0, 0.0));
    assert_eq!(s.transform() * Point::new(0.0, 0.0), Point::new(10.0, 0.0));
}

#[test]
fn scaling_temp_rect_scales_about_centre() {
    let mut s = Selection::new();
    s.set_selection(Rect::new(0.0, 0.0, 10.0, 10.0));
    s.set_temp_transformed(Rect::new(-5.0, -5.0, 15.0, 15.0));
    assert_eq!(s.transform() * Point::new(0.0, 0.0), Point::new(-5.0, -5.0));
    assert_eq!(s.transform() * Point::new(10.0, 10.0), Point::new(15.0, 15.0));
}

#[test]
fn cancel_transform_snaps_back() {
    let mut s = Selection::new();
    s.set_selection(Rect::new(0.0, 0.0, 10.0, 10.0));
    s.set_rotation(45.0);
    s.cancel_transform();
    assert!(!s.is_transforming());
    assert_eq!(s.state().rotation, 0.0);
    assert_eq!(s.state().temp_transformed, s.selection_rect());
}

#[test]
fn commit_makes_temp_rect_the_selection() {
    let mut s = Selection::new();
    s.set_selection(Rect::new(0.0, 0.0, 10.0, 10.0));
    s.set_temp_transformed(Rect::new(5.0, 5.0, 15.0, 15.0));
    s.commit_transform();
    assert_eq!(s.selection_rect(), Rect::new(5.0, 5.0, 15.0, 15.0));
    assert!(!s.is_transforming());
}
