pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Integer pixel rectangle in world (canvas document) space.
///
/// `x`/`y` is the top-left corner, the right and bottom edges are exclusive.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Empty rectangle at the origin.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from `[x0, x1) x [y0, y1)`. Inverted corners give an empty rect.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let w = x1.saturating_sub(x0).max(0) as u32;
        let h = y1.saturating_sub(y0).max(0) as u32;
        Self::new(x0, y0, w, h)
    }

    /// Smallest pixel rectangle covering `r`.
    pub fn from_rect(r: Rect) -> Self {
        let r = r.abs();
        Self::from_corners(
            r.x0.floor() as i32,
            r.y0.floor() as i32,
            r.x1.ceil() as i32,
            r.y1.ceil() as i32,
        )
    }

    /// True when the width or the height is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    /// Pixel count.
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether pixel `(x, y)` lies inside.
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Centre point.
    pub fn center(self) -> Point {
        Point::new(
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }

    /// Intersection of both rectangles; empty when they do not overlap.
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return Self::EMPTY;
        }
        Self::from_corners(x0, y0, x1, y1)
    }

    /// Bounding rectangle of both. Empty inputs are ignored.
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Shifted by `(dx, dy)`.
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// As a floating-point rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }

    /// Bounding box of this rectangle mapped through `affine`.
    pub fn map_bounds(self, affine: Affine) -> Rect {
        affine.transform_rect_bbox(self.to_rect())
    }
}

/// Interpolate each of the six affine coefficients independently.
///
/// `t = 0` yields `a`, `t = 1` yields `b`.
pub fn affine_lerp(a: Affine, b: Affine, t: f64) -> Affine {
    let ca = a.as_coeffs();
    let cb = b.as_coeffs();
    let mut out = [0.0; 6];
    for (i, o) in out.iter_mut().enumerate() {
        *o = ca[i] * (1.0 - t) + cb[i] * t;
    }
    Affine::new(out)
}

/// Uniform scale factor of an affine map (square root of the absolute determinant).
pub fn affine_scale(a: Affine) -> f64 {
    a.determinant().abs().sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
