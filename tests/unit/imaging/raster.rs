use super::*;
use kurbo::{Rect, Shape};

#[test]
fn fill_paths_paints_solid_rect() {
    let items = vec![FillItem {
        path: Rect::new(0.0, 0.0, 4.0, 4.0).to_path(0.1),
        color: [255, 0, 0, 255],
    }];
    let s = fill_paths(8, 8, &items).unwrap();
    assert_eq!(s.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(6, 6), Some([0, 0, 0, 0]));
}

#[test]
fn later_items_paint_on_top() {
    let items = vec![
        FillItem {
            path: Rect::new(0.0, 0.0, 4.0, 4.0).to_path(0.1),
            color: [255, 0, 0, 255],
        },
        FillItem {
            path: Rect::new(0.0, 0.0, 2.0, 2.0).to_path(0.1),
            color: [0, 0, 255, 255],
        },
    ];
    let s = fill_paths(4, 4, &items).unwrap();
    assert_eq!(s.pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(3, 3), Some([255, 0, 0, 255]));
}

#[test]
fn zero_sized_target_is_empty() {
    let s = fill_paths(0, 5, &[]).unwrap();
    assert_eq!(s.size(), (0, 5));
    assert!(s.data.is_empty());
}

#[test]
fn oversized_target_is_rejected() {
    let items = vec![FillItem {
        path: Rect::new(0.0, 0.0, 1.0, 1.0).to_path(0.1),
        color: [0, 0, 0, 255],
    }];
    assert!(fill_paths(70_000, 1, &items).is_err());
}

#[test]
fn stroke_outline_covers_width() {
    let outline = line_path(Point::new(0.0, 5.0), Point::new(10.0, 5.0), 2.0);
    let b = outline.bounding_box();
    assert!((b.y0 - 4.0).abs() < 1e-6);
    assert!((b.y1 - 6.0).abs() < 1e-6);
    assert!(b.x0 <= 0.0 && b.x1 >= 10.0);
}

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn red_blue() -> Vec<u8> {
    [RED, BLUE].concat()
}

fn image(data: &[u8], width: u32, height: u32) -> ImagePixels<'_> {
    ImagePixels {
        data,
        width,
        height,
    }
}

#[test]
fn integer_translation_places_pixels_exactly() {
    let src = red_blue();
    let mut s = Surface::new(4, 1);
    draw_image(
        &mut s,
        image(&src, 2, 1),
        Affine::translate((1.0, 0.0)),
        1.0,
        BlendMode::SourceOver,
        false,
    )
    .unwrap();
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(1, 0), Some(RED));
    assert_eq!(s.pixel(2, 0), Some(BLUE));
    assert_eq!(s.pixel(3, 0), Some([0, 0, 0, 0]));
}

#[test]
fn smooth_sampling_keeps_flat_regions() {
    let src = [RED; 4].concat();
    let mut s = Surface::new(8, 8);
    draw_image(
        &mut s,
        image(&src, 2, 2),
        Affine::scale(4.0),
        1.0,
        BlendMode::SourceOver,
        true,
    )
    .unwrap();
    let px = s.pixel(4, 4).unwrap();
    assert!(px[0] >= 254 && px[3] >= 254, "{px:?}");
}

#[test]
fn existing_pixels_stay_under_the_image() {
    let src = [BLUE].concat();
    let mut s = Surface::new(2, 1);
    s.fill(RED);
    draw_image(
        &mut s,
        image(&src, 1, 1),
        Affine::translate((1.0, 0.0)),
        1.0,
        BlendMode::SourceOver,
        false,
    )
    .unwrap();
    assert_eq!(s.pixel(0, 0), Some(RED));
    assert_eq!(s.pixel(1, 0), Some(BLUE));
}

#[test]
fn destination_out_erases_under_the_image() {
    let src = [[0, 0, 0, 255]].concat();
    let mut s = Surface::new(2, 1);
    s.fill(RED);
    draw_image(
        &mut s,
        image(&src, 1, 1),
        Affine::IDENTITY,
        1.0,
        BlendMode::DestinationOut,
        false,
    )
    .unwrap();
    assert_eq!(s.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(s.pixel(1, 0), Some(RED));
}

#[test]
fn multiply_with_white_keeps_destination() {
    let src = [[255, 255, 255, 255]].concat();
    let mut s = Surface::new(1, 1);
    s.fill([40, 80, 120, 255]);
    draw_image(
        &mut s,
        image(&src, 1, 1),
        Affine::IDENTITY,
        1.0,
        BlendMode::Multiply,
        false,
    )
    .unwrap();
    let px = s.pixel(0, 0).unwrap();
    for (got, want) in px.iter().zip([40u8, 80, 120, 255]) {
        assert!(got.abs_diff(want) <= 1, "{px:?}");
    }
}

#[test]
fn source_mode_replaces_covered_pixels() {
    let src = [[0, 0, 128, 128]].concat();
    let mut s = Surface::new(2, 1);
    s.fill(RED);
    draw_image(
        &mut s,
        image(&src, 1, 1),
        Affine::IDENTITY,
        1.0,
        BlendMode::Source,
        false,
    )
    .unwrap();
    let px = s.pixel(0, 0).unwrap();
    assert!(px[0] <= 1 && px[3].abs_diff(128) <= 1, "{px:?}");
    assert_eq!(s.pixel(1, 0), Some(RED));
}

#[test]
fn half_opacity_halves_coverage() {
    let src = [RED].concat();
    let mut s = Surface::new(1, 1);
    draw_image(
        &mut s,
        image(&src, 1, 1),
        Affine::IDENTITY,
        0.5,
        BlendMode::SourceOver,
        false,
    )
    .unwrap();
    let alpha = s.pixel(0, 0).unwrap()[3];
    assert!((127..=128).contains(&alpha), "alpha {alpha}");
}

#[test]
fn short_image_buffer_is_rejected() {
    let mut s = Surface::new(2, 2);
    let err = draw_image(
        &mut s,
        image(&[0, 0, 0], 1, 1),
        Affine::IDENTITY,
        1.0,
        BlendMode::SourceOver,
        false,
    );
    assert!(err.is_err());
}
