//! Camera layer framing and per-frame view resolution.

/// Camera interpolation and the on-canvas camera frame.
pub mod rig;

pub use rig::{
    CameraRig, MoveMode, interpolated_camera, transform_camera_view, view_transform_at_frame,
};
