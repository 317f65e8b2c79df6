use crate::foundation::core::{Affine, BezPath, Rect, affine_scale};
use crate::foundation::error::CelResult;
use crate::imaging::raster::{self, FillItem};
use crate::imaging::surface::Surface;
use kurbo::Shape;

const OUTLINE_COLOR: [u8; 4] = [0, 0, 0, 255];

/// One path of a vector drawing, in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    /// Outline in world space.
    pub path: BezPath,
    /// Straight-alpha RGBA8.
    pub color: [u8; 4],
    /// Stroke width in world units.
    pub width: f64,
    /// Fill the path instead of stroking it.
    pub filled: bool,
    /// Part of the current selection.
    pub selected: bool,
}

impl Curve {
    /// Stroked curve.
    pub fn stroked(path: BezPath, color: [u8; 4], width: f64) -> Self {
        Self {
            path,
            color,
            width,
            filled: false,
            selected: false,
        }
    }

    /// Filled curve.
    pub fn filled(path: BezPath, color: [u8; 4]) -> Self {
        Self {
            path,
            color,
            width: 0.0,
            filled: true,
            selected: false,
        }
    }

    /// World-space bounds including half the stroke width.
    pub fn bounds(&self) -> Rect {
        let b = self.path.bounding_box();
        if self.filled {
            b
        } else {
            b.inflate(self.width / 2.0, self.width / 2.0)
        }
    }
}

/// Curves of one vector key, painted in order.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorImage {
    curves: Vec<Curve>,
    opacity: f32,
}

impl Default for VectorImage {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorImage {
    /// Image without curves.
    pub fn new() -> Self {
        Self {
            curves: Vec::new(),
            opacity: 1.0,
        }
    }

    /// Curves in paint order.
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Append a curve on top.
    pub fn add_curve(&mut self, curve: Curve) {
        self.curves.push(curve);
    }

    /// True without curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Layer-level opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the layer-level opacity.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Append copies of `other`'s curves as the new selection.
    pub fn paste(&mut self, other: &VectorImage) {
        self.deselect_all();
        self.curves.extend(other.curves.iter().cloned().map(|mut c| {
            c.selected = true;
            c
        }));
    }

    /// Union of all curve bounds, `None` for an empty image.
    pub fn bounds(&self) -> Option<Rect> {
        self.curves
            .iter()
            .map(Curve::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Bounds of the selected curves, or an empty rect when nothing is selected.
    pub fn calculate_selection_rect(&self) -> Rect {
        self.curves
            .iter()
            .filter(|c| c.selected)
            .map(Curve::bounds)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    /// Flag every curve as selected.
    pub fn select_all(&mut self) {
        for c in &mut self.curves {
            c.selected = true;
        }
    }

    /// Clear every selection flag.
    pub fn deselect_all(&mut self) {
        for c in &mut self.curves {
            c.selected = false;
        }
    }

    /// Remove the selected curves.
    pub fn delete_selection(&mut self) {
        self.curves.retain(|c| !c.selected);
    }

    /// Copy holding only the selected curves, deselected.
    pub fn selected_copy(&self) -> VectorImage {
        VectorImage {
            curves: self
                .curves
                .iter()
                .filter(|c| c.selected)
                .cloned()
                .map(|mut c| {
                    c.selected = false;
                    c
                })
                .collect(),
            opacity: self.opacity,
        }
    }

    /// Apply `affine` to the selected curves.
    pub fn transform_selection(&mut self, affine: Affine) {
        for c in self.curves.iter_mut().filter(|c| c.selected) {
            c.path.apply_affine(affine);
        }
    }

    /// Rasterize into a `width` x `height` device surface with `view` already applied.
    ///
    /// `outlines` draws every curve as a thin black outline; `thin_lines` draws strokes one
    /// device pixel wide. Coverage is always antialiased by the rasterizer.
    pub fn output_image(
        &self,
        width: u32,
        height: u32,
        view: Affine,
        outlines: bool,
        thin_lines: bool,
        _antialias: bool,
    ) -> CelResult<Surface> {
        let scale = affine_scale(view);
        let mut items = Vec::with_capacity(self.curves.len());
        for curve in &self.curves {
            let mut device = curve.path.clone();
            device.apply_affine(view);
            if outlines {
                items.push(FillItem {
                    path: raster::stroke_to_fill(&device, 1.0, &[]),
                    color: OUTLINE_COLOR,
                });
                continue;
            }
            if curve.filled {
                items.push(FillItem {
                    path: device,
                    color: curve.color,
                });
            } else {
                let w = if thin_lines { 1.0 } else { curve.width * scale };
                items.push(FillItem {
                    path: raster::stroke_to_fill(&device, w, &[]),
                    color: curve.color,
                });
            }
        }
        raster::fill_paths(width, height, &items)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/vector.rs"]
mod tests;
