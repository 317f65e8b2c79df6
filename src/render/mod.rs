//! Canvas compositing: options, onion skin planning, overlays and the cached painter.

/// Onion skin planning.
pub mod onion;
/// Paint options.
pub mod options;
pub mod overlay;
/// The canvas painter.
pub mod painter;

pub use onion::{OnionDirection, OnionFrame, plan_onion_skin};
pub use options::{LayerVisibility, OnionStep, OverlayGuides, RenderOptions};
pub use painter::{CacheScope, CanvasPainter, PaintStats};
