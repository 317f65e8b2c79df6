#![forbid(unsafe_code)]
#![deny(missing_docs)]
//! Canvas compositing and undo history for frame-based 2D animation editors.
//!
//! [`render::CanvasPainter`] composites the layer stack of an [`Object`] at one frame with onion
//! skinning, layer visibility modes, a live stroke buffer and grid/guide overlays.
//! [`history::History`] keeps a bounded list of per-layer, per-frame backups for undo and redo.
//! [`Editor`] ties both to a current layer and frame.

pub mod camera;
/// JSON editor configuration.
pub mod config;
pub mod editor;
pub mod foundation;
pub mod history;
pub mod imaging;
pub mod model;
pub mod render;

pub use camera::{CameraRig, MoveMode, view_transform_at_frame};
pub use config::EditorConfig;
pub use editor::{Clipboard, ClipboardContent, Editor};
pub use foundation::core::{Affine, BezPath, PixelRect, Point, Rect, Vec2};
pub use foundation::error::{CelError, CelResult};
pub use history::{BackupContent, BackupElement, History, HistoryContext, HistoryOptions, Restored};
pub use imaging::{BitmapImage, BlendMode, Curve, Surface, VectorImage};
pub use model::{
    Camera, FsSoundLoader, KeyContent, KeyFrame, Layer, LayerKind, Object, Selection,
    SelectionState, SoundClip, SoundLoader,
};
pub use render::{
    CacheScope, CanvasPainter, LayerVisibility, OnionStep, OverlayGuides, PaintStats,
    RenderOptions,
};
