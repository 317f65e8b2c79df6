use super::*;

#[test]
fn view_applies_translation_then_rotation_then_scale() {
    let cam = Camera::new(Vec2::new(100.0, 0.0), 0.0, 1.0);
    assert_eq!(cam.view().as_coeffs(), [1.0, 0.0, 0.0, 1.0, 100.0, 0.0]);

    let cam = Camera::new(Vec2::new(10.0, 0.0), 0.0, 2.0);
    let p = cam.view() * Point::new(1.0, 1.0);
    assert_eq!(p, Point::new(22.0, 2.0));
}

#[test]
fn setters_invalidate_cached_view() {
    let mut cam = Camera::default();
    assert_eq!(cam.view(), Affine::IDENTITY);
    cam.translate(Vec2::new(5.0, 6.0));
    assert_eq!(cam.view().translation(), Vec2::new(5.0, 6.0));
    cam.scale(2.0);
    assert_eq!(cam.view().translation(), Vec2::new(10.0, 12.0));
    cam.reset();
    assert_eq!(cam.view(), Affine::IDENTITY);
}

#[test]
fn scale_with_offset_keeps_anchor() {
    let mut cam = Camera::default();
    cam.scale_with_offset(2.0, Point::new(10.0, 10.0));
    assert_eq!(cam.scaling(), 2.0);
    assert_eq!(cam.translation(), Vec2::new(-5.0, -5.0));
}

#[test]
fn equality_ignores_lens_settings() {
    let a = Camera::new(Vec2::new(1.0, 2.0), 30.0, 1.5);
    let mut b = a.clone();
    b.set_aperture(2.8);
    b.set_focal_length(85.0);
    assert_eq!(a, b);
    b.rotate(31.0);
    assert_ne!(a, b);
}

#[test]
fn assign_copies_transform_only() {
    let src = Camera::new(Vec2::new(3.0, 4.0), 10.0, 0.5);
    let mut dst = Camera::default();
    dst.set_distance(42.0);
    dst.assign(&src);
    assert_eq!(dst, src);
    assert_eq!(dst.distance(), 42.0);
}

#[test]
fn depth_of_field_math() {
    let cam = Camera::default();
    let expected = 50.0 * 50.0 / (0.03 * 8.0) + 50.0;
    assert!((cam.hyperfocal_distance() - expected).abs() < 1e-9);

    let near = near_focus_distance(1000.0, 500.0, 50.0);
    let far = far_focus_distance(1000.0, 500.0, 50.0);
    assert!((near - 475_000.0 / 1400.0).abs() < 1e-9);
    assert!((far - 950.0).abs() < 1e-9);
    assert!(near < 500.0 && 500.0 < far);
}
