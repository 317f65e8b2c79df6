use crate::foundation::core::{Affine, PixelRect, Point, affine_lerp};
use crate::foundation::math::lerp;
use crate::model::camera::Camera;
use crate::model::keyframe::{KeyContent, KeyFrame};
use crate::model::layer::Layer;

/// Default output field width.
pub const DEFAULT_FIELD_WIDTH: u32 = 800;
/// Default output field height.
pub const DEFAULT_FIELD_HEIGHT: u32 = 600;

/// Drag handle of the on-canvas camera frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveMode {
    /// No handle.
    None,
    /// Move the whole frame.
    Center,
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
    /// Rotation handle above the frame.
    Rotation,
}

/// Per-camera-layer framing state: the output field and the frame currently shown on canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraRig {
    view_rect: PixelRect,
    aspect_ratio: f64,
    current_rect: PixelRect,
    offset: Point,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::with_field(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT)
    }
}

impl CameraRig {
    /// Rig for a `width` x `height` output field centred on the origin. Degenerate sizes fall
    /// back to 800x600.
    pub fn with_field(width: u32, height: u32) -> Self {
        let (w, h) = if width < 2 || height < 2 {
            (DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT)
        } else {
            (width, height)
        };
        let view_rect = PixelRect::new(-(w as i32) / 2, -(h as i32) / 2, w, h);
        Self {
            view_rect,
            aspect_ratio: f64::from(h) / f64::from(w),
            current_rect: view_rect,
            offset: Point::ZERO,
        }
    }

    /// Output field, centred on the origin.
    pub fn view_rect(&self) -> PixelRect {
        self.view_rect
    }

    /// Height over width of the output field.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Frame shown on canvas at the current frame.
    pub fn current_rect(&self) -> PixelRect {
        self.current_rect
    }

    /// Anchor for the next `Center` drag.
    pub fn set_offset_point(&mut self, point: Point) {
        self.offset = point;
    }

    /// Which handle of the current frame lies under `point`. Corners win over the rotation
    /// handle, which wins over the body.
    pub fn move_mode_for_point(&self, point: Point, tolerance: f64) -> MoveMode {
        let r = self.current_rect;
        let (left, top) = (f64::from(r.x), f64::from(r.y));
        let (right, bottom) = (f64::from(r.right()), f64::from(r.bottom()));
        let near = |x: f64, y: f64| point.distance(Point::new(x, y)) < tolerance;

        if near(left, top) {
            MoveMode::TopLeft
        } else if near(right, top) {
            MoveMode::TopRight
        } else if near(left, bottom) {
            MoveMode::BottomLeft
        } else if near(right, bottom) {
            MoveMode::BottomRight
        } else if near(right, top + f64::from(r.height) / 2.0) {
            MoveMode::Rotation
        } else if r.contains(point.x.floor() as i32, point.y.floor() as i32) {
            MoveMode::Center
        } else {
            MoveMode::None
        }
    }

    fn drag(&mut self, mode: MoveMode, point: Point) {
        let r = self.current_rect;
        let px = point.x as i32;
        let aspect = self.aspect_ratio;
        let height_for = |w: i32| (f64::from(w) * aspect) as i32;
        match mode {
            MoveMode::Center => {
                let d = point - self.offset;
                self.current_rect = r.translated(d.x.round() as i32, d.y.round() as i32);
                self.offset = point;
            }
            MoveMode::TopLeft
                if point.x < f64::from(r.right()) && point.y < f64::from(r.bottom()) =>
            {
                let w = r.right() - px;
                let h = height_for(w);
                self.current_rect =
                    PixelRect::from_corners(r.right() - w, r.bottom() - h, r.right(), r.bottom());
            }
            MoveMode::TopRight if point.x > f64::from(r.x) && point.y < f64::from(r.bottom()) =>
            {
                let w = px - r.x;
                let h = height_for(w);
                self.current_rect =
                    PixelRect::from_corners(r.x, r.bottom() - h, r.x + w, r.bottom());
            }
            MoveMode::BottomLeft if point.x < f64::from(r.right()) && point.y > f64::from(r.y) =>
            {
                let w = r.right() - px;
                let h = height_for(w);
                self.current_rect = PixelRect::from_corners(px, r.y, r.right(), r.y + h);
            }
            MoveMode::BottomRight if point.x > f64::from(r.x) && point.y > f64::from(r.y) => {
                let w = px - r.x;
                let h = height_for(w);
                self.current_rect = PixelRect::from_corners(r.x, r.y, r.x + w, r.y + h);
            }
            _ => {}
        }
    }
}

/// Camera view at `frame`, interpolated linearly between the bracketing camera keys.
///
/// No keys, or no camera content around `frame`, yields the identity.
pub fn view_transform_at_frame(layer: &Layer, frame: u32) -> Affine {
    if layer.key_count() == 0 {
        return Affine::IDENTITY;
    }
    let prev = layer.last_key_at(frame).filter(|k| k.as_camera().is_some());
    let next_pos = layer
        .next_key_position(frame)
        .or_else(|| layer.max_key_position())
        .unwrap_or(frame);
    let next = layer
        .last_key_at(next_pos)
        .filter(|k| k.as_camera().is_some());

    match (prev, next) {
        (None, None) => Affine::IDENTITY,
        (Some(k), None) | (None, Some(k)) => camera_view(k),
        (Some(a), Some(b)) if a.pos() == b.pos() => camera_view(a),
        (Some(a), Some(b)) => {
            let t = (f64::from(frame) - f64::from(a.pos()))
                / (f64::from(b.pos()) - f64::from(a.pos()));
            affine_lerp(camera_view(a), camera_view(b), t)
        }
    }
}

/// Camera parameters for a new key at `pos`, lerped between the key covering `pos - 1` and the
/// key after `pos`.
pub fn interpolated_camera(layer: &Layer, pos: u32) -> Camera {
    let mut cam = Camera::default();
    if layer.key_count() == 0 {
        return cam;
    }
    let before = layer
        .last_key_at(pos.saturating_sub(1))
        .and_then(|k| Some((k.pos(), k.as_camera()?)));
    let next_pos = layer
        .next_key_position(pos)
        .or_else(|| layer.max_key_position())
        .unwrap_or(pos);
    let after = layer
        .last_key_at(next_pos)
        .and_then(|k| Some((k.pos(), k.as_camera()?)));

    match (before, after) {
        (None, None) => {}
        (Some((_, c)), None) | (None, Some((_, c))) => cam.assign(c),
        (Some((p1, c1)), Some((p2, _))) if p1 == p2 => cam.assign(c1),
        (Some((p1, c1)), Some((p2, c2))) => {
            let t = (f64::from(pos) - f64::from(p1)) / (f64::from(p2) - f64::from(p1));
            let tr1 = c1.translation();
            let tr2 = c2.translation();
            cam.translate(kurbo::Vec2::new(lerp(tr1.x, tr2.x, t), lerp(tr1.y, tr2.y, t)));
            cam.rotate(lerp(c1.rotation(), c2.rotation(), t));
            cam.scale(lerp(c1.scaling(), c2.scaling(), t));
        }
    }
    cam
}

/// Build the camera key for `pos` and frame the rig around it.
pub(crate) fn create_camera_key(layer: &mut Layer, pos: u32) -> KeyFrame {
    let mut cam = interpolated_camera(layer, pos);
    if let Some(rig) = layer.rig.as_mut() {
        let scale = if cam.scaling() == 0.0 { 1.0 } else { cam.scaling() };
        let w = (f64::from(rig.view_rect.width) / scale) as i32;
        let h = (f64::from(rig.view_rect.height) / scale) as i32;
        let [.., dx, dy] = cam.view().as_coeffs();
        let rect = PixelRect::new(
            dx as i32 - w / 2,
            dy as i32 - h / 2,
            w.max(0) as u32,
            h.max(0) as u32,
        );
        rig.current_rect = rect;
        cam.set_cam_rect(rect);
    }
    KeyFrame::new(pos, KeyContent::Camera(cam))
}

/// Drag or resize the camera frame with `mode` and write the result into the key at `frame`.
pub fn transform_camera_view(layer: &mut Layer, frame: u32, mode: MoveMode, point: Point) {
    let Some(rig) = layer.rig.as_mut() else {
        return;
    };
    rig.drag(mode, point);
    let rect = rig.current_rect;
    let view_width = f64::from(rig.view_rect.width);

    let Some(cam) = layer.keys.get_mut(&frame).and_then(KeyFrame::as_camera_mut) else {
        return;
    };
    cam.translate(rect.center().to_vec2());
    if rect.width > 0 {
        cam.scale(view_width / f64::from(rect.width));
    }
    cam.set_cam_rect(rect);
    tracing::debug!(frame, ?rect, "camera view transformed");
}

/// Sync the rig's on-canvas frame with the key at `frame`, if it recorded one.
pub fn update_cam_rect(layer: &mut Layer, frame: u32) {
    let Some(rect) = layer
        .key_at(frame)
        .and_then(KeyFrame::as_camera)
        .and_then(Camera::cam_rect)
    else {
        return;
    };
    if let Some(rig) = layer.rig.as_mut() {
        rig.current_rect = rect;
    }
}

fn camera_view(key: &KeyFrame) -> Affine {
    key.as_camera().map_or(Affine::IDENTITY, Camera::view)
}

#[cfg(test)]
#[path = "../../tests/unit/camera/rig.rs"]
mod tests;
