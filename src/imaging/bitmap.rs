use crate::foundation::core::{Affine, PixelRect, Point, Rect};
use crate::foundation::error::{CelError, CelResult};
use crate::foundation::math::premultiply;
use crate::imaging::composite::{self, BlendMode, PremulRgba8, source_in};
use crate::imaging::surface::Surface;

/// Raster image positioned in world space.
///
/// Pixels are premultiplied RGBA8 covering exactly `bounds`. An image with empty bounds holds
/// no pixels and paints nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct BitmapImage {
    bounds: PixelRect,
    pixels: Vec<u8>,
    opacity: f32,
}

impl Default for BitmapImage {
    fn default() -> Self {
        Self::new()
    }
}

impl BitmapImage {
    /// Empty image.
    pub fn new() -> Self {
        Self {
            bounds: PixelRect::EMPTY,
            pixels: Vec::new(),
            opacity: 1.0,
        }
    }

    /// Wrap premultiplied RGBA8 pixels covering `bounds`.
    pub fn from_pixels(bounds: PixelRect, pixels: Vec<u8>) -> CelResult<Self> {
        let expected = (bounds.area() as usize) * 4;
        if pixels.len() != expected {
            return Err(CelError::validation(format!(
                "bitmap pixel buffer has {} bytes, {}x{} needs {expected}",
                pixels.len(),
                bounds.width,
                bounds.height
            )));
        }
        Ok(Self {
            bounds,
            pixels,
            opacity: 1.0,
        })
    }

    /// Image of `bounds` filled with a straight-alpha color.
    pub fn from_color(bounds: PixelRect, rgba: [u8; 4]) -> Self {
        let px = premultiply(rgba);
        let mut pixels = Vec::with_capacity((bounds.area() as usize) * 4);
        for _ in 0..bounds.area() {
            pixels.extend_from_slice(&px);
        }
        Self {
            bounds,
            pixels,
            opacity: 1.0,
        }
    }

    /// World-space area covered by the pixels.
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    /// Premultiplied RGBA8 pixels, row-major over `bounds`.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True when the bounds are empty.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Layer-level opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the layer-level opacity.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Premultiplied pixel at world `(x, y)`; transparent outside the bounds.
    pub fn pixel_at(&self, x: i32, y: i32) -> PremulRgba8 {
        match self.index_of(x, y) {
            Some(idx) => [
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            ],
            None => [0; 4],
        }
    }

    /// Write a straight-alpha pixel. Positions outside the bounds are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if !self.bounds.contains(x, y) {
            self.extend(PixelRect::new(x, y, 1, 1));
        }
        if let Some(idx) = self.index_of(x, y) {
            self.pixels[idx..idx + 4].copy_from_slice(&premultiply(rgba));
        }
    }

    /// Grow the bounds to also cover `rect`, keeping existing pixels in place.
    pub fn extend(&mut self, rect: PixelRect) {
        let target = self.bounds.union(rect);
        if target == self.bounds {
            return;
        }
        if self.is_empty() {
            *self = Self {
                opacity: self.opacity,
                ..Self::from_color(target, [0, 0, 0, 0])
            };
            return;
        }
        let mut pixels = vec![0u8; (target.area() as usize) * 4];
        let row_bytes = (self.bounds.width as usize) * 4;
        let dx = (self.bounds.x - target.x) as usize;
        let dy = (self.bounds.y - target.y) as usize;
        for row in 0..self.bounds.height as usize {
            let src = row * row_bytes;
            let dst = ((row + dy) * (target.width as usize) + dx) * 4;
            pixels[dst..dst + row_bytes].copy_from_slice(&self.pixels[src..src + row_bytes]);
        }
        self.bounds = target;
        self.pixels = pixels;
    }

    /// Composite `other` onto this image. The bounds grow to cover `other` unless the blend can
    /// only remove coverage.
    pub fn paste(&mut self, other: &BitmapImage, mode: BlendMode) {
        if other.is_empty() {
            return;
        }
        if mode != BlendMode::DestinationOut {
            self.extend(other.bounds);
        }
        let overlap = self.bounds.intersect(other.bounds);
        for y in overlap.y..overlap.bottom() {
            for x in overlap.x..overlap.right() {
                let (Some(d), Some(s)) = (self.index_of(x, y), other.index_of(x, y)) else {
                    continue;
                };
                let dst = [
                    self.pixels[d],
                    self.pixels[d + 1],
                    self.pixels[d + 2],
                    self.pixels[d + 3],
                ];
                let src = [
                    other.pixels[s],
                    other.pixels[s + 1],
                    other.pixels[s + 2],
                    other.pixels[s + 3],
                ];
                let out = composite::blend(dst, src, mode, other.opacity);
                self.pixels[d..d + 4].copy_from_slice(&out);
            }
        }
    }

    /// Copy of the `rect` region. Parts of `rect` outside the image are transparent.
    pub fn copy(&self, rect: PixelRect) -> BitmapImage {
        let mut out = BitmapImage::from_color(rect, [0, 0, 0, 0]);
        let overlap = self.bounds.intersect(rect);
        for y in overlap.y..overlap.bottom() {
            let (Some(s), Some(d)) = (self.index_of(overlap.x, y), out.index_of(overlap.x, y))
            else {
                continue;
            };
            let len = (overlap.width as usize) * 4;
            out.pixels[d..d + len].copy_from_slice(&self.pixels[s..s + len]);
        }
        out.opacity = self.opacity;
        out
    }

    /// Make every pixel inside `rect` transparent.
    pub fn clear(&mut self, rect: PixelRect) {
        let overlap = self.bounds.intersect(rect);
        for y in overlap.y..overlap.bottom() {
            if let Some(idx) = self.index_of(overlap.x, y) {
                let len = (overlap.width as usize) * 4;
                self.pixels[idx..idx + len].fill(0);
            }
        }
    }

    /// Paint a solid rectangle, growing the bounds as needed.
    pub fn fill_rect(&mut self, rect: PixelRect, rgba: [u8; 4]) {
        self.paste(&BitmapImage::from_color(rect, rgba), BlendMode::SourceOver);
    }

    /// Tint every non-transparent pixel with `rgba`, keeping its coverage (source-in).
    pub fn colorize(&mut self, rgba: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            let out = source_in([px[0], px[1], px[2], px[3]], rgba);
            px.copy_from_slice(&out);
        }
    }

    /// The `selection` region mapped through the world-space `affine`.
    ///
    /// Bilinear sampling when `antialias` is set, nearest-neighbour otherwise.
    pub fn transformed(&self, selection: PixelRect, affine: Affine, antialias: bool) -> BitmapImage {
        let source = self.copy(selection);
        if source.is_empty() {
            return BitmapImage::new();
        }
        let target = PixelRect::from_rect(selection.map_bounds(affine));
        let placement = Affine::translate((-f64::from(target.x), -f64::from(target.y)))
            * affine
            * Affine::translate((f64::from(selection.x), f64::from(selection.y)));

        let mut canvas = Surface::new(target.width, target.height);
        let drawn = canvas
            .draw_pixels(
                &source.pixels,
                source.bounds.width,
                source.bounds.height,
                placement,
                1.0,
                BlendMode::SourceOver,
                antialias,
            )
            .and_then(|()| BitmapImage::from_pixels(target, canvas.data));
        match drawn {
            Ok(mut out) => {
                out.opacity = self.opacity;
                out
            }
            Err(e) => {
                tracing::debug!(error = %e, "bitmap transform produced nothing");
                BitmapImage::new()
            }
        }
    }

    /// Move the image so its top-left corner sits at `point`.
    pub fn move_top_left(&mut self, point: Point) {
        self.bounds.x = point.x.round() as i32;
        self.bounds.y = point.y.round() as i32;
    }

    /// Copy of the whole image stretched to fill `rect`.
    pub fn scaled_to(&self, rect: PixelRect, antialias: bool) -> BitmapImage {
        if self.is_empty() || rect.is_empty() {
            return BitmapImage::new();
        }
        let from = self.bounds.to_rect();
        let to = rect.to_rect();
        let affine = Affine::translate((to.x0, to.y0))
            * Affine::scale_non_uniform(to.width() / from.width(), to.height() / from.height())
            * Affine::translate((-from.x0, -from.y0));
        self.transformed(self.bounds, affine, antialias)
    }

    /// Tight bounds of the non-transparent pixels, in world space.
    pub fn opaque_bounds(&self) -> PixelRect {
        let mut found = PixelRect::EMPTY;
        for y in self.bounds.y..self.bounds.bottom() {
            for x in self.bounds.x..self.bounds.right() {
                if self.pixel_at(x, y)[3] != 0 {
                    found = found.union(PixelRect::new(x, y, 1, 1));
                }
            }
        }
        found
    }

    /// Draw onto a device surface where `view` maps world space to device space.
    pub fn draw_onto(
        &self,
        target: &mut Surface,
        view: Affine,
        opacity: f32,
        antialias: bool,
    ) -> CelResult<()> {
        if self.is_empty() || opacity <= 0.0 {
            return Ok(());
        }
        let placement = view
            * Affine::translate((f64::from(self.bounds.x), f64::from(self.bounds.y)));
        target.draw_pixels(
            &self.pixels,
            self.bounds.width,
            self.bounds.height,
            placement,
            opacity,
            BlendMode::SourceOver,
            antialias,
        )
    }

    /// Device-space bounding box of this image under `view`.
    pub fn device_bounds(&self, view: Affine) -> Rect {
        self.bounds.map_bounds(view)
    }

    /// Copy resampled by `factor` (< 1 shrinks) using a triangle filter.
    pub(crate) fn prescaled(&self, factor: f64) -> CelResult<BitmapImage> {
        if self.is_empty() || factor >= 1.0 || factor <= 0.0 {
            return Ok(self.clone());
        }
        let w = ((f64::from(self.bounds.width) * factor).round() as u32).max(1);
        let h = ((f64::from(self.bounds.height) * factor).round() as u32).max(1);
        let src = image::RgbaImage::from_raw(
            self.bounds.width,
            self.bounds.height,
            self.pixels.clone(),
        )
        .ok_or_else(|| CelError::render("bitmap buffer does not match its bounds"))?;
        let resized = image::imageops::resize(&src, w, h, image::imageops::FilterType::Triangle);
        let mut out = BitmapImage::from_pixels(
            PixelRect::new(self.bounds.x, self.bounds.y, w, h),
            resized.into_raw(),
        )?;
        out.opacity = self.opacity;
        Ok(out)
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let col = (x - self.bounds.x) as usize;
        let row = (y - self.bounds.y) as usize;
        Some((row * (self.bounds.width as usize) + col) * 4)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/bitmap.rs"]
mod tests;
