//! Error types for the tolldata pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Format error in {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task graph error: {0}")]
    Graph(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EtlError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        EtlError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn transport(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        EtlError::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn format(path: impl AsRef<Path>, message: impl std::fmt::Display) -> Self {
        EtlError::Format {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Classify the error so callers can branch without parsing messages
    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::Io { .. } => ErrorKind::Io,
            EtlError::Transport { .. } => ErrorKind::Transport,
            EtlError::Format { .. } => ErrorKind::Format,
            EtlError::Alignment(_) => ErrorKind::Alignment,
            EtlError::Config(_) => ErrorKind::Config,
            EtlError::Graph(_) => ErrorKind::Graph,
            EtlError::Serialization(_) | EtlError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Coarse failure category reported per task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Io,
    Transport,
    Format,
    Alignment,
    Config,
    Graph,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Format => write!(f, "format"),
            ErrorKind::Alignment => write!(f, "alignment"),
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Graph => write!(f, "graph"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}
