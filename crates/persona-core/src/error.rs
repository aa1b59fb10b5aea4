//! Error types for the bootstrap protocol

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which kind of access to the data store was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

/// Every way a bootstrap run can fail. All of them are fatal to the run.
#[derive(Error, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BootError {
    #[error("required file missing: {file}")]
    MissingFile { file: String },

    #[error("cannot {access} {path}")]
    PermissionDenied { access: Access, path: String },

    #[error("malformed data in {file}: {reason}")]
    MalformedData { file: String, reason: String },

    #[error("critical data missing: {}", .missing.join(", "))]
    IntegrityError { missing: Vec<String> },

    #[error("cannot run step {step}: {completed} steps completed, {} required", .step.saturating_sub(1))]
    IncompleteSequence { step: u8, completed: u8 },

    #[error("step {step} tried to overwrite {entity}.{key}")]
    KeyConflict {
        entity: String,
        key: String,
        step: u8,
    },

    #[error("io error on {path}: {message}")]
    Io { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, BootError>;

impl BootError {
    pub fn missing_file(file: impl Into<String>) -> Self {
        Self::MissingFile { file: file.into() }
    }

    pub fn permission_denied(access: Access, path: impl Into<String>) -> Self {
        Self::PermissionDenied {
            access,
            path: path.into(),
        }
    }

    pub fn malformed(file: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::MalformedData {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    pub fn key_conflict(entity: impl Into<String>, key: impl Into<String>, step: u8) -> Self {
        Self::KeyConflict {
            entity: entity.into(),
            key: key.into(),
            step,
        }
    }

    /// Wrap an I/O error. `NotFound` becomes `MissingFile`, `PermissionDenied`
    /// becomes a read refusal, anything else keeps its message.
    pub fn from_io(path: impl Into<String>, err: &std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::MissingFile { file: path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                access: Access::Read,
                path,
            },
            _ => Self::Io {
                path,
                message: err.to_string(),
            },
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFile { .. } => "missing_file",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::MalformedData { .. } => "malformed_data",
            Self::IntegrityError { .. } => "integrity_error",
            Self::IncompleteSequence { .. } => "incomplete_sequence",
            Self::KeyConflict { .. } => "key_conflict",
            Self::Io { .. } => "io",
        }
    }
}
