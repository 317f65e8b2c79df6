//! Bounded linear undo/redo of per-layer, per-frame content.

/// Backup snapshots and history options.
pub mod element;
/// The undo list.
pub mod manager;

pub use element::{BackupContent, BackupElement, HistoryOptions};
pub use manager::{History, HistoryContext, NOOP_LABEL, Restored};
