use super::*;

#[test]
fn pixel_rect_intersection_and_union() {
    let a = PixelRect::new(0, 0, 10, 10);
    let b = PixelRect::new(5, 5, 10, 10);
    assert_eq!(a.intersect(b), PixelRect::new(5, 5, 5, 5));
    assert_eq!(a.union(b), PixelRect::new(0, 0, 15, 15));

    let far = PixelRect::new(100, 100, 1, 1);
    assert!(a.intersect(far).is_empty());
    assert_eq!(PixelRect::EMPTY.union(b), b);
}

#[test]
fn pixel_rect_from_rect_rounds_outwards() {
    let r = Rect::new(0.2, -0.5, 3.1, 2.0);
    assert_eq!(PixelRect::from_rect(r), PixelRect::new(0, -1, 4, 3));
}

#[test]
fn pixel_rect_contains_uses_exclusive_edges() {
    let r = PixelRect::new(-2, -2, 4, 4);
    assert!(r.contains(-2, -2));
    assert!(r.contains(1, 1));
    assert!(!r.contains(2, 0));
}

#[test]
fn affine_lerp_interpolates_translation() {
    let a = Affine::IDENTITY;
    let b = Affine::translate((100.0, 0.0));
    let mid = affine_lerp(a, b, 0.5);
    assert_eq!(mid.as_coeffs(), [1.0, 0.0, 0.0, 1.0, 50.0, 0.0]);
    assert_eq!(affine_lerp(a, b, 0.0), a);
    assert_eq!(affine_lerp(a, b, 1.0), b);
}

#[test]
fn affine_scale_of_uniform_zoom() {
    let s = affine_scale(Affine::scale(0.5) * Affine::rotate(1.0));
    assert!((s - 0.5).abs() < 1e-12);
}
