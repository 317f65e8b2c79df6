use std::path::{Path, PathBuf};

use crate::foundation::error::{CelError, CelResult};

/// Reference to an audio file placed on a sound layer. Samples are never held here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundClip {
    file_name: Option<PathBuf>,
    display_name: String,
    frame_length: u32,
}

impl Default for SoundClip {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundClip {
    /// Clip with no file, spanning one frame.
    pub fn new() -> Self {
        Self {
            file_name: None,
            display_name: String::new(),
            frame_length: 1,
        }
    }

    /// Path of the audio file, once loaded.
    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    /// Record the audio file path.
    pub fn set_file_name(&mut self, path: impl Into<PathBuf>) {
        self.file_name = Some(path.into());
    }

    /// Name shown on the timeline.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Set the timeline name.
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    /// Number of frames the clip spans on the timeline (at least one).
    pub fn frame_length(&self) -> u32 {
        self.frame_length.max(1)
    }

    /// Set the span in frames. Zero is raised to one.
    pub fn set_frame_length(&mut self, frames: u32) {
        self.frame_length = frames.max(1);
    }
}

/// Loads audio for a clip. Decoding lives outside this crate.
pub trait SoundLoader {
    /// Load the file at `path` into `clip`, setting its file and display names.
    fn load(&mut self, clip: &mut SoundClip, path: &Path) -> CelResult<()>;
}

/// Loader that only checks the file exists and records its path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSoundLoader;

impl SoundLoader for FsSoundLoader {
    fn load(&mut self, clip: &mut SoundClip, path: &Path) -> CelResult<()> {
        if !path.is_file() {
            return Err(CelError::Other(anyhow::anyhow!(
                "sound file '{}' does not exist",
                path.display()
            )));
        }
        clip.set_file_name(path);
        if clip.display_name().is_empty()
            && let Some(stem) = path.file_stem()
        {
            clip.set_display_name(stem.to_string_lossy());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/sound.rs"]
mod tests;
