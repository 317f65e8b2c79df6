use std::cell::Cell;

use crate::foundation::core::{Affine, PixelRect, Point, Vec2};

/// Circle of confusion used by the depth-of-field helpers, in millimetres.
pub const CIRCLE_OF_CONFUSION: f64 = 0.03;

/// Camera keyframe content: a translation, a rotation in degrees and a uniform scale.
///
/// The view matrix is derived lazily and cached until one of the parameters changes.
#[derive(Clone, Debug)]
pub struct Camera {
    translation: Vec2,
    rotation: f64,
    scale: f64,
    distance: f64,
    aperture: f64,
    focal_length: f64,
    cam_rect: Option<PixelRect>,
    view: Cell<Option<Affine>>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            distance: 10.0,
            aperture: 8.0,
            focal_length: 50.0,
            cam_rect: None,
            view: Cell::new(None),
        }
    }
}

impl PartialEq for Camera {
    fn eq(&self, other: &Self) -> bool {
        self.translation == other.translation
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}

impl Camera {
    /// Camera with the given transform and default lens settings.
    pub fn new(translation: Vec2, rotation: f64, scale: f64) -> Self {
        Self {
            translation,
            rotation,
            scale,
            ..Self::default()
        }
    }

    /// World-to-view matrix: translation first, then rotation, then scale.
    pub fn view(&self) -> Affine {
        if let Some(v) = self.view.get() {
            return v;
        }
        let v = Affine::scale(self.scale)
            * Affine::rotate(self.rotation.to_radians())
            * Affine::translate(self.translation);
        self.view.set(Some(v));
        v
    }

    /// Translation in world units.
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Uniform scale.
    pub fn scaling(&self) -> f64 {
        self.scale
    }

    /// Set the translation.
    pub fn translate(&mut self, translation: Vec2) {
        self.translation = translation;
        self.view.set(None);
    }

    /// Set the rotation in degrees.
    pub fn rotate(&mut self, degrees: f64) {
        self.rotation = degrees;
        self.view.set(None);
    }

    /// Set the uniform scale.
    pub fn scale(&mut self, scale: f64) {
        self.scale = scale;
        self.view.set(None);
    }

    /// Change the scale while keeping the world point under `offset` fixed (zoom at cursor).
    pub fn scale_with_offset(&mut self, scale: f64, offset: Point) {
        if scale == 0.0 {
            return;
        }
        let o = offset.to_vec2();
        self.translation = (self.translation + o) * self.scale / scale - o;
        self.scale(scale);
    }

    /// Back to identity: no translation, rotation or scale.
    pub fn reset(&mut self) {
        self.translation = Vec2::ZERO;
        self.rotation = 0.0;
        self.scale = 1.0;
        self.view.set(None);
    }

    /// Copy the transform parameters of `other`, leaving the lens settings untouched.
    pub fn assign(&mut self, other: &Camera) {
        self.translation = other.translation;
        self.rotation = other.rotation;
        self.scale = other.scale;
        self.view.set(None);
    }

    /// Output frame recorded for this key.
    pub fn cam_rect(&self) -> Option<PixelRect> {
        self.cam_rect
    }

    /// Record the output frame.
    pub fn set_cam_rect(&mut self, rect: PixelRect) {
        self.cam_rect = Some(rect);
    }

    /// Focus distance in metres.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Set the focus distance.
    pub fn set_distance(&mut self, distance: f64) {
        self.distance = distance;
    }

    /// Aperture as an f-number.
    pub fn aperture(&self) -> f64 {
        self.aperture
    }

    /// Set the f-number.
    pub fn set_aperture(&mut self, aperture: f64) {
        self.aperture = aperture;
    }

    /// Focal length in millimetres.
    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    /// Set the focal length.
    pub fn set_focal_length(&mut self, focal_length: f64) {
        self.focal_length = focal_length;
    }

    /// Distance beyond which everything is in acceptable focus.
    pub fn hyperfocal_distance(&self) -> f64 {
        hyperfocal_distance(self.focal_length, self.aperture)
    }

    /// Nearest distance in acceptable focus.
    pub fn near_focus_distance(&self) -> f64 {
        near_focus_distance(
            self.hyperfocal_distance(),
            self.distance,
            self.focal_length,
        )
    }

    /// Farthest distance in acceptable focus.
    pub fn far_focus_distance(&self) -> f64 {
        far_focus_distance(
            self.hyperfocal_distance(),
            self.distance,
            self.focal_length,
        )
    }
}

/// Hyperfocal distance for a lens and f-number.
pub fn hyperfocal_distance(focal_length: f64, aperture: f64) -> f64 {
    (focal_length * focal_length) / (CIRCLE_OF_CONFUSION * aperture) + focal_length
}

/// Nearest distance in acceptable focus for hyperfocal `h`, focus distance `s`.
pub fn near_focus_distance(h: f64, s: f64, focal_length: f64) -> f64 {
    (s * (h - focal_length)) / (h + s - 2.0 * focal_length)
}

/// Farthest distance in acceptable focus; negative or infinite once `s` passes `h`.
pub fn far_focus_distance(h: f64, s: f64, focal_length: f64) -> f64 {
    (s * (h - focal_length)) / (h - s)
}

#[cfg(test)]
#[path = "../../tests/unit/model/camera.rs"]
mod tests;
