use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

#[test]
fn paste_grows_bounds_to_union() {
    let mut a = BitmapImage::from_color(PixelRect::new(0, 0, 2, 2), RED);
    let b = BitmapImage::from_color(PixelRect::new(3, 3, 1, 1), BLUE);
    a.paste(&b, BlendMode::SourceOver);

    assert_eq!(a.bounds(), PixelRect::new(0, 0, 4, 4));
    assert_eq!(a.pixel_at(0, 0), RED);
    assert_eq!(a.pixel_at(2, 2), CLEAR);
    assert_eq!(a.pixel_at(3, 3), BLUE);
}

#[test]
fn paste_into_empty_image_copies_pixels() {
    let mut a = BitmapImage::new();
    let b = BitmapImage::from_color(PixelRect::new(-5, 7, 2, 1), BLUE);
    a.paste(&b, BlendMode::SourceOver);
    assert_eq!(a.bounds(), b.bounds());
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn eraser_paste_keeps_bounds_and_clears_coverage() {
    let mut a = BitmapImage::from_color(PixelRect::new(0, 0, 2, 2), RED);
    let eraser = BitmapImage::from_color(PixelRect::new(1, 1, 5, 5), [0, 0, 0, 255]);
    a.paste(&eraser, BlendMode::DestinationOut);
    assert_eq!(a.bounds(), PixelRect::new(0, 0, 2, 2));
    assert_eq!(a.pixel_at(0, 0), RED);
    assert_eq!(a.pixel_at(1, 1), CLEAR);
}

#[test]
fn copy_pads_outside_with_transparency() {
    let a = BitmapImage::from_color(PixelRect::new(0, 0, 2, 2), RED);
    let c = a.copy(PixelRect::new(1, 1, 2, 2));
    assert_eq!(c.bounds(), PixelRect::new(1, 1, 2, 2));
    assert_eq!(c.pixel_at(1, 1), RED);
    assert_eq!(c.pixel_at(2, 2), CLEAR);
}

#[test]
fn clear_and_opaque_bounds() {
    let mut a = BitmapImage::from_color(PixelRect::new(0, 0, 4, 4), RED);
    a.clear(PixelRect::new(0, 0, 4, 2));
    assert_eq!(a.pixel_at(0, 0), CLEAR);
    assert_eq!(a.opaque_bounds(), PixelRect::new(0, 2, 4, 2));
}

#[test]
fn colorize_is_source_in() {
    let mut a = BitmapImage::from_color(PixelRect::new(0, 0, 1, 1), [10, 200, 10, 255]);
    a.colorize(BLUE);
    assert_eq!(a.pixel_at(0, 0), BLUE);
}

#[test]
fn transformed_translation_moves_selection() {
    let mut a = BitmapImage::from_color(PixelRect::new(0, 0, 2, 2), RED);
    a.set_pixel(1, 1, BLUE);
    let moved = a.transformed(
        PixelRect::new(0, 0, 2, 2),
        Affine::translate((10.0, 0.0)),
        false,
    );
    assert_eq!(moved.bounds(), PixelRect::new(10, 0, 2, 2));
    assert_eq!(moved.pixel_at(10, 0), RED);
    assert_eq!(moved.pixel_at(11, 1), BLUE);
}

#[test]
fn transformed_rotation_turns_row_into_column() {
    let mut a = BitmapImage::from_color(PixelRect::new(0, 0, 2, 1), RED);
    a.set_pixel(1, 0, BLUE);
    let turned = a.transformed(
        PixelRect::new(0, 0, 2, 1),
        Affine::new([0.0, 1.0, -1.0, 0.0, 0.0, 0.0]),
        false,
    );
    assert_eq!(turned.bounds(), PixelRect::new(-1, 0, 1, 2));
    assert_eq!(turned.pixel_at(-1, 0), RED);
    assert_eq!(turned.pixel_at(-1, 1), BLUE);
}

#[test]
fn scaled_to_fills_target_rect() {
    let a = BitmapImage::from_color(PixelRect::new(0, 0, 2, 2), RED);
    let s = a.scaled_to(PixelRect::new(0, 0, 4, 4), false);
    assert_eq!(s.bounds(), PixelRect::new(0, 0, 4, 4));
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(s.pixel_at(x, y), RED);
        }
    }
}

#[test]
fn move_top_left_keeps_pixels() {
    let mut a = BitmapImage::from_color(PixelRect::new(0, 0, 1, 1), RED);
    a.move_top_left(Point::new(5.0, -3.0));
    assert_eq!(a.bounds(), PixelRect::new(5, -3, 1, 1));
    assert_eq!(a.pixel_at(5, -3), RED);
}

#[test]
fn prescaled_halves_dimensions() {
    let a = BitmapImage::from_color(PixelRect::new(2, 2, 4, 4), RED);
    let p = a.prescaled(0.5).unwrap();
    assert_eq!(p.bounds(), PixelRect::new(2, 2, 2, 2));
    assert_eq!(p.pixel_at(2, 2), RED);
    assert_eq!(a.prescaled(1.0).unwrap(), a);
}

#[test]
fn draw_onto_places_image_through_view() {
    let a = BitmapImage::from_color(PixelRect::new(1, 0, 1, 1), RED);
    let mut s = Surface::new(4, 1);
    a.draw_onto(&mut s, Affine::translate((2.0, 0.0)), 1.0, true)
        .unwrap();
    assert_eq!(s.pixel(3, 0), Some(RED));
    assert_eq!(s.pixel(2, 0), Some(CLEAR));
}

#[test]
fn from_pixels_validates_length() {
    assert!(BitmapImage::from_pixels(PixelRect::new(0, 0, 2, 2), vec![0; 4]).is_err());
}
