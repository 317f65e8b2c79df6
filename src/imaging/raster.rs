use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Point};
use crate::foundation::error::{CelError, CelResult};
use crate::imaging::composite::BlendMode;
use crate::imaging::surface::Surface;

const STROKE_TOLERANCE: f64 = 0.1;

/// One filled path in device space with a straight-alpha color.
#[derive(Clone, Debug)]
pub struct FillItem {
    /// Outline to fill, in device space.
    pub path: BezPath,
    /// Straight-alpha RGBA8.
    pub color: [u8; 4],
}

/// Rasterize `items` in order onto a transparent `width` x `height` surface.
#[tracing::instrument(level = "trace", skip(items), fields(items = items.len()))]
pub fn fill_paths(width: u32, height: u32, items: &[FillItem]) -> CelResult<Surface> {
    if width == 0 || height == 0 || items.is_empty() {
        return Ok(Surface::new(width, height));
    }
    let (w, h) = size_to_u16(width, height)?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(affine_to_cpu(Affine::IDENTITY));
    for item in items {
        let [r, g, b, a] = item.color;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_path(&bezpath_to_cpu(&item.path));
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    Surface::from_premul_bytes(width, height, pixmap.data_as_u8_slice().to_vec())
}

/// Outline of `path` stroked with `width`, optionally dashed, as a fillable path.
pub fn stroke_to_fill(path: &BezPath, width: f64, dashes: &[f64]) -> BezPath {
    let mut style = kurbo::Stroke::new(width.max(0.0));
    if !dashes.is_empty() {
        style = style.with_dashes(0.0, dashes.iter().copied());
    }
    kurbo::stroke(
        path.iter(),
        &style,
        &kurbo::StrokeOpts::default(),
        STROKE_TOLERANCE,
    )
}

/// Straight segment from `a` to `b` outlined `width` wide.
pub fn line_path(a: Point, b: Point, width: f64) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(a);
    p.line_to(b);
    stroke_to_fill(&p, width, &[])
}

/// Single-pixel coverage mask for guides drawn in device space.
pub(crate) fn coverage_mask(width: u32, height: u32, paths: Vec<BezPath>) -> CelResult<Surface> {
    let items: Vec<FillItem> = paths
        .into_iter()
        .map(|path| FillItem {
            path,
            color: [255, 255, 255, 255],
        })
        .collect();
    fill_paths(width, height, &items)
}

/// Borrowed premultiplied RGBA8 pixels, tightly packed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ImagePixels<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Draw `image` onto `target`, where `placement` maps image pixel coordinates into the target.
///
/// `smooth` picks bilinear sampling, otherwise nearest-neighbour.
#[tracing::instrument(
    level = "trace",
    skip(target, image),
    fields(w = image.width, h = image.height)
)]
pub(crate) fn draw_image(
    target: &mut Surface,
    image: ImagePixels<'_>,
    placement: Affine,
    opacity: f32,
    mode: BlendMode,
    smooth: bool,
) -> CelResult<()> {
    let expected = (image.width as usize)
        .checked_mul(image.height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CelError::render("image buffer size overflow"))?;
    if image.data.len() != expected {
        return Err(CelError::render("image buffer does not match width*height*4"));
    }
    if expected == 0 || target.data.is_empty() || opacity <= 0.0 {
        return Ok(());
    }
    if placement.determinant().abs() < 1e-12 {
        return Ok(());
    }

    let (w, h) = size_to_u16(target.width, target.height)?;
    let paint = image_paint(
        premul_bytes_to_pixmap(image.data, image.width, image.height)?,
        smooth,
    );

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    if !target.is_blank() {
        let backdrop = premul_bytes_to_pixmap(&target.data, target.width, target.height)?;
        ctx.set_transform(affine_to_cpu(Affine::IDENTITY));
        ctx.set_paint(image_paint(backdrop, false));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
    }

    let rect = vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(image.width),
        f64::from(image.height),
    );
    let opacity = opacity.min(1.0);
    ctx.set_transform(affine_to_cpu(placement));

    if mode == BlendMode::Source {
        // Clear the covered area, then paint over it.
        ctx.push_blend_layer(blend_to_cpu(BlendMode::DestinationOut));
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        ctx.fill_rect(&rect);
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        ctx.pop_layer();
    }

    let blended = matches!(mode, BlendMode::DestinationOut | BlendMode::Multiply);
    if blended {
        ctx.push_blend_layer(blend_to_cpu(mode));
    }
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.set_paint(paint);
    ctx.fill_rect(&rect);
    if opacity < 1.0 {
        ctx.pop_layer();
    }
    if blended {
        ctx.pop_layer();
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    target.data.copy_from_slice(pixmap.data_as_u8_slice());
    Ok(())
}

fn blend_to_cpu(mode: BlendMode) -> vello_cpu::peniko::BlendMode {
    use vello_cpu::peniko::{Compose, Mix};

    match mode {
        BlendMode::SourceOver | BlendMode::Source => {
            vello_cpu::peniko::BlendMode::new(Mix::Normal, Compose::SrcOver)
        }
        BlendMode::DestinationOut => {
            vello_cpu::peniko::BlendMode::new(Mix::Normal, Compose::DestOut)
        }
        BlendMode::Multiply => vello_cpu::peniko::BlendMode::new(Mix::Multiply, Compose::SrcOver),
    }
}

fn image_paint(pixmap: vello_cpu::Pixmap, smooth: bool) -> vello_cpu::Image {
    let quality = if smooth {
        vello_cpu::peniko::ImageQuality::Medium
    } else {
        vello_cpu::peniko::ImageQuality::Low
    };
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default().with_quality(quality),
    }
}

fn size_to_u16(width: u32, height: u32) -> CelResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CelError::render("raster width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CelError::render("raster height exceeds u16"))?;
    Ok((w, h))
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CelResult<vello_cpu::Pixmap> {
    let (w, h) = size_to_u16(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CelError::render("pixmap byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/raster.rs"]
mod tests;
