use std::path::PathBuf;

/// Why a configuration file could not be turned into a [`crate::Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A failed pipeline stage. Every variant aborts the current iteration and is
/// reported through the notification channels.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("FAILED updating repo {repo} during `git {step}`:\n{detail}")]
    Sync {
        repo: String,
        step: String,
        detail: String,
    },
    #[error("FAILED to delete dist item {}:\n{source}", .entry.display())]
    Cleanup {
        entry: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("BUILD FAILED:\n{detail}")]
    Build { detail: String },
    #[error("INSTALL FAILED:\n{detail}")]
    Install { detail: String },
}

impl UpdateError {
    /// Short stage name for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            UpdateError::Sync { .. } => "sync",
            UpdateError::Cleanup { .. } => "cleanup",
            UpdateError::Build { .. } => "build",
            UpdateError::Install { .. } => "install",
        }
    }
}
