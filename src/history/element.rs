use std::{io::Read, path::PathBuf};

use crate::foundation::error::{CelError, CelResult};
use crate::imaging::{BitmapImage, VectorImage};
use crate::model::layer::LayerKind;
use crate::model::selection::SelectionState;

/// Deep copy of the content a backup captured.
#[derive(Clone, Debug, PartialEq)]
pub enum BackupContent {
    /// Pixels and selection of a bitmap key.
    Bitmap {
        /// The bitmap as it was.
        image: BitmapImage,
        /// Selection at backup time.
        selection: SelectionState,
    },
    /// Curves and selection of a vector key.
    Vector {
        /// The curves as they were.
        image: VectorImage,
        /// Selection at backup time.
        selection: SelectionState,
    },
    /// Sound keys are restored by reloading the file.
    Sound {
        /// Audio file to reload.
        file_name: Option<PathBuf>,
        /// Timeline name of the clip.
        display_name: String,
    },
}

impl BackupContent {
    /// Kind of layer this content restores into.
    pub fn layer_kind(&self) -> LayerKind {
        match self {
            Self::Bitmap { .. } => LayerKind::Bitmap,
            Self::Vector { .. } => LayerKind::Vector,
            Self::Sound { .. } => LayerKind::Sound,
        }
    }

    /// Selection captured with the content. Sound backups carry none.
    pub fn selection(&self) -> Option<&SelectionState> {
        match self {
            Self::Bitmap { selection, .. } | Self::Vector { selection, .. } => Some(selection),
            Self::Sound { .. } => None,
        }
    }
}

/// One undo snapshot of a single layer/frame.
#[derive(Clone, Debug, PartialEq)]
pub struct BackupElement {
    /// Positional layer index, renumbered when layers are deleted or swapped.
    pub layer: usize,
    /// Frame the backup was taken at.
    pub frame: u32,
    /// Label shown in the history list.
    pub label: String,
    /// Captured content.
    pub content: BackupContent,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Undo depth and autosave policy.
pub struct HistoryOptions {
    /// Maximum number of retained backups.
    pub capacity: usize,
    /// Emit "needs save" every `autosave_interval` backups.
    pub autosave: bool,
    /// Backups between two "needs save" signals.
    pub autosave_interval: u32,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            capacity: 20,
            autosave: true,
            autosave_interval: 20,
        }
    }
}

impl HistoryOptions {
    /// Reject a zero capacity or interval.
    pub fn validate(&self) -> CelResult<()> {
        if self.capacity < 2 {
            return Err(CelError::config("history capacity must be at least 2"));
        }
        if self.autosave && self.autosave_interval == 0 {
            return Err(CelError::config("autosave interval must be non-zero"));
        }
        Ok(())
    }

    /// Parse and validate JSON from `reader`.
    pub fn from_reader(reader: impl Read) -> CelResult<Self> {
        let opts: Self = serde_json::from_reader(reader)
            .map_err(|e| CelError::config(format!("parse history options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }
}
