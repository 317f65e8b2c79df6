/// Result alias used throughout the crate.
pub type CelResult<T> = Result<T, CelError>;

/// Every failure the crate reports.
#[derive(thiserror::Error, Debug)]
pub enum CelError {
    /// Rejected input: bad frame ranges, mismatched layer kinds, malformed buffers.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rasterization or surface problems.
    #[error("render error: {0}")]
    Render(String),

    /// Unreadable or invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Failure from an external collaborator such as a sound loader.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CelError {
    /// Build a `Validation` error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a `Render` error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a `Config` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
