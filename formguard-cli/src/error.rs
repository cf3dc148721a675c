//! Error types

use std::path::PathBuf;

use formguard::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture: {0}")]
    Json(#[from] serde_json::Error),

    /// The fixture parsed but describes something the replay can't do.
    #[error("fixture error: {0}")]
    Fixture(String),

    #[error("validation setup failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("cannot install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl CliError {
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture(message.into())
    }
}
