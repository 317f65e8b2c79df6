use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn destination_out_erases_under_opaque_source() {
    let dst = [10, 20, 30, 255];
    assert_eq!(
        blend(dst, [0, 0, 0, 255], BlendMode::DestinationOut, 1.0),
        [0, 0, 0, 0]
    );
    assert_eq!(
        blend(dst, [0, 0, 0, 0], BlendMode::DestinationOut, 1.0),
        dst
    );
}

#[test]
fn source_mode_replaces_even_with_transparency() {
    let dst = [10, 20, 30, 255];
    assert_eq!(blend(dst, [0, 0, 0, 0], BlendMode::Source, 1.0), [0, 0, 0, 0]);
}

#[test]
fn multiply_with_white_keeps_destination() {
    let dst = [40, 80, 120, 255];
    assert_eq!(
        blend(dst, [255, 255, 255, 255], BlendMode::Multiply, 1.0),
        dst
    );
}

#[test]
fn source_in_keeps_coverage_and_replaces_color() {
    assert_eq!(source_in([0, 90, 0, 128], [255, 0, 0, 255]), [128, 0, 0, 128]);
    assert_eq!(source_in([9, 9, 9, 0], [255, 0, 0, 255]), [0, 0, 0, 0]);
}

#[test]
fn invert_turns_empty_into_black_and_black_into_white() {
    assert_eq!(invert_with_coverage([0, 0, 0, 0], 255), [0, 0, 0, 255]);
    assert_eq!(invert_with_coverage([0, 0, 0, 255], 255), [255, 255, 255, 255]);
    assert_eq!(invert_with_coverage([1, 2, 3, 4], 0), [1, 2, 3, 4]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    let src = vec![0u8; 4];
    assert!(over_in_place(&mut dst, &src, 1.0).is_err());
}
