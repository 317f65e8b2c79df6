//! Pixel and path content: device surfaces, world-space bitmap and vector images, blending.

/// World-space raster images.
pub mod bitmap;
/// Premultiplied pixel compositing.
pub mod composite;
/// Path filling on vello_cpu.
pub mod raster;
/// Device-space canvas.
pub mod surface;
/// Curves and vector images.
pub mod vector;

pub use bitmap::BitmapImage;
pub use composite::BlendMode;
pub use surface::Surface;
pub use vector::{Curve, VectorImage};
