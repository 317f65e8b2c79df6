use std::path::Path;

use crate::foundation::core::{Affine, PixelRect};
use crate::foundation::error::{CelError, CelResult};
use crate::foundation::math::{premultiply, unpremultiply};
use crate::imaging::composite::{self, BlendMode, PremulRgba8, invert_with_coverage, source_in};
use crate::imaging::raster::{self, ImagePixels};

/// Device-space drawing target in premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl Surface {
    /// Transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Wrap premultiplied bytes. The length must be `width * height * 4`.
    pub fn from_premul_bytes(width: u32, height: u32, data: Vec<u8>) -> CelResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(CelError::render(format!(
                "surface byte length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Fill with a straight-alpha color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        let px = premultiply(rgba);
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Write a premultiplied pixel. Positions outside are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: PremulRgba8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data[idx..idx + 4].copy_from_slice(&px);
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Composite a same-sized surface on top of this one.
    pub fn draw_surface(&mut self, src: &Surface, opacity: f32) -> CelResult<()> {
        if src.size() != self.size() {
            return Err(CelError::render(format!(
                "cannot draw {}x{} surface onto {}x{}",
                src.width, src.height, self.width, self.height
            )));
        }
        composite::over_in_place(&mut self.data, &src.data, opacity)
    }

    /// Draw premultiplied pixels whose pixel `(0, 0)` maps through `affine` into device space.
    pub(crate) fn draw_pixels(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        affine: Affine,
        opacity: f32,
        mode: BlendMode,
        smooth: bool,
    ) -> CelResult<()> {
        raster::draw_image(
            self,
            ImagePixels {
                data,
                width,
                height,
            },
            affine,
            opacity,
            mode,
            smooth,
        )
    }

    /// Replace the color of every painted pixel, keeping its coverage.
    pub fn colorize(&mut self, rgba: [u8; 4]) {
        for d in self.data.chunks_exact_mut(4) {
            let out = source_in([d[0], d[1], d[2], d[3]], rgba);
            d.copy_from_slice(&out);
        }
    }

    /// Invert destination colors under a same-sized coverage mask.
    pub(crate) fn invert_under_mask(&mut self, mask: &Surface) -> CelResult<()> {
        if mask.size() != self.size() {
            return Err(CelError::render("invert mask size mismatch"));
        }
        for (d, m) in self
            .data
            .chunks_exact_mut(4)
            .zip(mask.data.chunks_exact(4))
        {
            let out = invert_with_coverage([d[0], d[1], d[2], d[3]], m[3]);
            d.copy_from_slice(&out);
        }
        Ok(())
    }

    /// Surface contents in the device rectangle `[0, width) x [0, height)`.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// Straight-alpha copy for export.
    pub fn to_rgba_image(&self) -> CelResult<image::RgbaImage> {
        let mut straight = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            straight.extend_from_slice(&unpremultiply([px[0], px[1], px[2], px[3]]));
        }
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| CelError::render("surface buffer does not match its size"))
    }

    /// Write a straight-alpha PNG to `path`.
    pub fn save_png(&self, path: impl AsRef<Path>) -> CelResult<()> {
        let path = path.as_ref();
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| CelError::render(format!("write png '{}': {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/surface.rs"]
mod tests;
