use crate::foundation::error::{CelError, CelResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8, unpremultiply};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Porter-Duff / separable blend used when pasting one image onto another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Normal painting.
    #[default]
    SourceOver,
    /// Replace destination pixels inside the source area.
    Source,
    /// Erase the destination where the source is opaque.
    DestinationOut,
    /// Multiply colors, used by marker-style brushes.
    Multiply,
}

/// Source-over of `src` at `opacity` onto `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = unit_to_u8(f64::from(opacity));
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Blend one premultiplied pixel onto another with `mode`.
pub fn blend(dst: PremulRgba8, src: PremulRgba8, mode: BlendMode, opacity: f32) -> PremulRgba8 {
    match mode {
        BlendMode::SourceOver => over(dst, src, opacity),
        BlendMode::Source => {
            let op = unit_to_u8(f64::from(opacity));
            let inv = 255 - op;
            let mut out = [0u8; 4];
            for i in 0..4 {
                out[i] = add_sat_u8(
                    mul_div255(u16::from(src[i]), op),
                    mul_div255(u16::from(dst[i]), inv),
                );
            }
            out
        }
        BlendMode::DestinationOut => {
            let op = unit_to_u8(f64::from(opacity));
            let sa = mul_div255(u16::from(src[3]), op);
            let keep = 255 - u16::from(sa);
            [
                mul_div255(u16::from(dst[0]), keep),
                mul_div255(u16::from(dst[1]), keep),
                mul_div255(u16::from(dst[2]), keep),
                mul_div255(u16::from(dst[3]), keep),
            ]
        }
        BlendMode::Multiply => {
            let op = f32::from(unit_to_u8(f64::from(opacity))) / 255.0;
            let s = src.map(|c| f32::from(c) / 255.0 * op);
            let d = dst.map(|c| f32::from(c) / 255.0);
            let mut out = [0u8; 4];
            for i in 0..3 {
                let v = s[i] * (1.0 - d[3]) + d[i] * (1.0 - s[3]) + s[i] * d[i];
                out[i] = to_u8(v);
            }
            out[3] = to_u8(s[3] + d[3] - s[3] * d[3]);
            out
        }
    }
}

/// Source-in with a solid straight-alpha color: keeps the destination coverage, replaces its
/// color.
pub fn source_in(dst: PremulRgba8, color: [u8; 4]) -> PremulRgba8 {
    let coverage = mul_div255(u16::from(dst[3]), u16::from(color[3]));
    [
        mul_div255(u16::from(color[0]), u16::from(coverage)),
        mul_div255(u16::from(color[1]), u16::from(coverage)),
        mul_div255(u16::from(color[2]), u16::from(coverage)),
        coverage,
    ]
}

/// Invert the destination color wherever `coverage` is non-zero.
///
/// Transparent destination pixels count as white, so guides stay visible on an empty canvas.
pub fn invert_with_coverage(dst: PremulRgba8, coverage: u8) -> PremulRgba8 {
    if coverage == 0 {
        return dst;
    }
    let straight = if dst[3] == 0 {
        [255, 255, 255, 255]
    } else {
        unpremultiply(dst)
    };
    let inv = [255 - straight[0], 255 - straight[1], 255 - straight[2], coverage];
    let cov = u16::from(coverage);
    let src = [
        mul_div255(u16::from(inv[0]), cov),
        mul_div255(u16::from(inv[1]), cov),
        mul_div255(u16::from(inv[2]), cov),
        coverage,
    ];
    over(dst, src, 1.0)
}

/// Source-over of one buffer onto another of the same length.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> CelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CelError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/composite.rs"]
mod tests;
