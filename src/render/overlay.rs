//! World-space geometry of the canvas overlays: grid, axis and camera guides.

use kurbo::{Line, ParamCurve};

use crate::foundation::core::{Affine, PixelRect, Point, Rect};
use crate::render::options::OverlayGuides;

/// Grid line colour.
pub const GRID_COLOR: [u8; 4] = [211, 211, 211, 255];
/// Vertical axis colour.
pub const AXIS_Y_COLOR: [u8; 4] = [0, 255, 0, 255];
/// Horizontal axis colour.
pub const AXIS_X_COLOR: [u8; 4] = [255, 0, 0, 255];
/// Dash pattern of the camera guides, in device pixels.
pub const GUIDE_DASHES: [f64; 2] = [10.0, 10.0];

const AXIS_EXTENT: f64 = 500.0;

fn snap_to_grid(v: f64, size: i32) -> i32 {
    (v as i32) / size * size
}

/// Grid lines covering `visible` (world space) with one spare cell on every side.
pub fn grid_lines(visible: Rect, cell_width: u32, cell_height: u32) -> Vec<Line> {
    let gw = i32::try_from(cell_width).unwrap_or(i32::MAX).max(1);
    let gh = i32::try_from(cell_height).unwrap_or(i32::MAX).max(1);
    let left = snap_to_grid(visible.x0, gw).saturating_sub(gw);
    let right = snap_to_grid(visible.x1, gw).saturating_add(gw);
    let top = snap_to_grid(visible.y0, gh).saturating_sub(gh);
    let bottom = snap_to_grid(visible.y1, gh).saturating_add(gh);

    let mut lines = Vec::new();
    let (t, b) = (f64::from(top), f64::from(bottom));
    let (l, r) = (f64::from(left), f64::from(right));
    for x in (left..right).step_by(gw as usize) {
        let x = f64::from(x);
        lines.push(Line::new((x, t), (x, b)));
    }
    for y in (top..bottom).step_by(gh as usize) {
        let y = f64::from(y);
        lines.push(Line::new((l, y), (r, y)));
    }
    lines
}

/// The world axes: vertical (green) then horizontal (red).
pub fn axis_lines() -> [(Line, [u8; 4]); 2] {
    [
        (
            Line::new((0.0, -AXIS_EXTENT), (0.0, AXIS_EXTENT)),
            AXIS_Y_COLOR,
        ),
        (
            Line::new((-AXIS_EXTENT, 0.0), (AXIS_EXTENT, 0.0)),
            AXIS_X_COLOR,
        ),
    ]
}

/// Camera frame corners in world space, clockwise from top-left.
pub fn camera_frame(camera_view: Affine, view_rect: PixelRect) -> [Point; 4] {
    let inv = camera_view.inverse();
    let r = view_rect.to_rect();
    [
        inv * Point::new(r.x0, r.y0),
        inv * Point::new(r.x1, r.y0),
        inv * Point::new(r.x1, r.y1),
        inv * Point::new(r.x0, r.y1),
    ]
}

fn at(line: Line, t: f64) -> Point {
    line.eval(t).round()
}

fn split_lines(poly: &[Point; 4], a: f64, b: f64) -> [Line; 4] {
    let top = Line::new(poly[0], poly[1]);
    let bottom = Line::new(poly[3], poly[2]);
    let left = Line::new(poly[0], poly[3]);
    let right = Line::new(poly[1], poly[2]);
    [
        Line::new(at(top, a), at(bottom, a)),
        Line::new(at(top, b), at(bottom, b)),
        Line::new(at(left, a), at(right, a)),
        Line::new(at(left, b), at(right, b)),
    ]
}

fn center_cross(poly: &[Point; 4]) -> [Line; 2] {
    let top = at(Line::new(poly[0], poly[1]), 0.5);
    let bottom = at(Line::new(poly[2], poly[3]), 0.5);
    let left = at(Line::new(poly[0], poly[3]), 0.5);
    let right = at(Line::new(poly[1], poly[2]), 0.5);
    let v = Line::new(top, bottom);
    let h = Line::new(left, right);
    [
        Line::new(at(v, 0.4), at(v, 0.6)),
        Line::new(at(h, 0.4), at(h, 0.6)),
    ]
}

/// Four edges of the safe box inset by `pct` percent along the frame diagonals.
fn safe_box(poly: &[Point; 4], pct: u32) -> [Line; 4] {
    let d1 = Line::new(poly[0], poly[2]);
    let d2 = Line::new(poly[3], poly[1]);
    let near = f64::from(pct) / 2.0 / 100.0;
    let far = (100.0 - f64::from(pct) / 2.0) / 100.0;
    [
        Line::new(at(d1, near), at(d2, far)),
        Line::new(at(d1, near), at(d2, near)),
        Line::new(at(d1, far), at(d2, far)),
        Line::new(at(d1, far), at(d2, near)),
    ]
}

/// One-point perspective: rays from the corners and edge midpoints to the frame centre.
fn perspective_rays(poly: &[Point; 4]) -> Vec<Line> {
    let centre = at(Line::new(poly[0], poly[2]), 0.5);
    let mut rays = Vec::with_capacity(8);
    for i in 0..4 {
        let a = poly[i];
        let b = poly[(i + 1) % 4];
        rays.push(Line::new(a, centre));
        rays.push(Line::new(at(Line::new(a, b), 0.5), centre));
    }
    rays
}

/// Every enabled guide for the camera frame `poly`, in world space.
pub fn guide_lines(poly: &[Point; 4], guides: &OverlayGuides) -> Vec<Line> {
    let mut lines = Vec::new();
    if guides.center {
        lines.extend(center_cross(poly));
    }
    if guides.thirds {
        lines.extend(split_lines(poly, 0.333, 0.667));
    }
    if guides.golden_ratio {
        lines.extend(split_lines(poly, 0.382, 0.618));
    }
    if guides.safe_areas {
        if guides.action_safe {
            lines.extend(safe_box(poly, guides.action_safe_pct));
        }
        if guides.title_safe {
            lines.extend(safe_box(poly, guides.title_safe_pct));
        }
    }
    if guides.perspective {
        lines.extend(perspective_rays(poly));
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
