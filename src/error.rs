use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Failed to fetch mirror directory from {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("No mirror servers found in the directory document")]
    EmptyDirectory,

    #[error("No mirror responded to the speed test")]
    NoUsableMirrors,

    #[error("Failed to back up {path:?}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No write access to {0:?} (try running as root)")]
    PermissionDenied(PathBuf),

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, MirrorError>;
