use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("duration must be a positive integer (minutes)")]
    InvalidDuration(i64),

    #[error(
        "no writable bin directory found.\n       Add ~/.local/bin to your PATH or run with sudo for /usr/local/bin."
    )]
    NoWritableInstallTarget,

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl AgentError {
    /// Adapter for `map_err` that tags an I/O failure with what was attempted and where.
    pub fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| AgentError::Io {
            action,
            path,
            source,
        }
    }
}
