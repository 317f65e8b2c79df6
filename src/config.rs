use std::{fs::File, io::Read, path::Path};

use crate::foundation::error::{CelError, CelResult};
use crate::history::HistoryOptions;
use crate::render::RenderOptions;

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Editor preferences loaded at startup: paint options plus undo policy.
pub struct EditorConfig {
    /// Paint options.
    pub render: RenderOptions,
    /// Undo depth and autosave.
    pub history: HistoryOptions,
}

impl EditorConfig {
    /// Check both sections.
    pub fn validate(&self) -> CelResult<()> {
        self.render.validate()?;
        self.history.validate()
    }

    /// Parse and validate JSON from `reader`.
    pub fn from_reader(reader: impl Read) -> CelResult<Self> {
        let config: Self = serde_json::from_reader(reader)
            .map_err(|e| CelError::config(format!("parse editor config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file. Config errors are prefixed with the path.
    pub fn from_path(path: impl AsRef<Path>) -> CelResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| CelError::config(format!("open '{}': {e}", path.display())))?;
        Self::from_reader(std::io::BufReader::new(file)).map_err(|e| match e {
            CelError::Config(msg) => CelError::config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Serialize as indented JSON.
    pub fn to_json_pretty(&self) -> CelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CelError::config(format!("serialize editor config: {e}")))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
