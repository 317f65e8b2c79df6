//! Layer/keyframe project model shared by the compositor and the history.

/// Camera keyframe content.
pub mod camera;
/// Keyframes and their content.
pub mod keyframe;
/// Layers and range edits on their keys.
pub mod layer;
/// The layer stack.
pub mod object;
/// Selection rectangles and the pending transform.
pub mod selection;
/// Sound clips and their loader.
pub mod sound;

pub use camera::Camera;
pub use keyframe::{KeyContent, KeyFrame};
pub use layer::{Layer, LayerKind};
pub use object::Object;
pub use selection::{Selection, SelectionState};
pub use sound::{FsSoundLoader, SoundClip, SoundLoader};
