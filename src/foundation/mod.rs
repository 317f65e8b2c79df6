//! Shared geometry, pixel math and the crate error type.

/// Geometry types.
pub mod core;
/// Crate error type.
pub mod error;
pub(crate) mod math;
