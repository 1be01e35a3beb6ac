use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// An exception raised inside the neuroimaging library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fault {
    /// Exception class, e.g. `ValueError`.
    pub kind: String,
    pub message: String,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into() }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to start Python interpreter `{}`: {source}", .python.display())]
    Spawn {
        python: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("MNE-Python is not available: {0}")]
    ToolkitUnavailable(Fault),

    #[error("MNE driver protocol error: {0}")]
    Protocol(String),

    #[error("failed to load KIT recording: {0}")]
    Load(Fault),

    #[error("failed to mark bad channels: {0}")]
    Annotate(Fault),

    #[error("tSSS filtering failed: {0}")]
    Filter(Fault),

    #[error("failed to write {}: {fault}", .path.display())]
    Write { path: PathBuf, fault: Fault },

    #[error("could not read back {}: {source:#}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("output check failed for {}: {reason}", .path.display())]
    Verify { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Process exit status for this error.  Usage errors exit with 2 from
    /// clap before a `ConvertError` can exist.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::InputNotFound(_) => 3,
            ConvertError::Spawn { .. }
            | ConvertError::ToolkitUnavailable(_)
            | ConvertError::Protocol(_)
            | ConvertError::Json(_) => 4,
            ConvertError::Load(_) => 5,
            ConvertError::Annotate(_) => 6,
            ConvertError::Filter(_) => 7,
            ConvertError::Write { .. } | ConvertError::Io(_) => 8,
            ConvertError::Inspect { .. } | ConvertError::Verify { .. } => 9,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
