// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for filekit

use std::io;
use thiserror::Error;

/// Result type alias
pub type FhResult<T> = Result<T, FhError>;

/// Main error type
///
/// Canonical path resolution never produces one of these: a failed
/// canonicalization degrades to the absolute path instead.
#[derive(Error, Debug)]
pub enum FhError {
    #[error("Cannot list directory {path}: {source}")]
    Listing {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot create directory {path}: {source}")]
    Creation {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot delete {path}: {source}")]
    Deletion {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot move {from} to {to}: {source}")]
    Move {
        from: String,
        to: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Backend not found: {0}")]
    BackendNotFound(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl FhError {
    pub fn listing(path: impl Into<String>, source: io::Error) -> Self {
        FhError::Listing { path: path.into(), source }
    }

    pub fn creation(path: impl Into<String>, source: io::Error) -> Self {
        FhError::Creation { path: path.into(), source }
    }

    pub fn deletion(path: impl Into<String>, source: io::Error) -> Self {
        FhError::Deletion { path: path.into(), source }
    }

    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        FhError::Io { path: path.into(), source }
    }

    /// Path the failed operation targeted, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            FhError::Listing { path, .. }
            | FhError::Creation { path, .. }
            | FhError::Deletion { path, .. }
            | FhError::Io { path, .. } => Some(path),
            FhError::Move { from, .. } => Some(from),
            FhError::InvalidPath(path) => Some(path),
            FhError::BackendNotFound(_) | FhError::Unsupported(_) => None,
        }
    }

    /// Underlying OS error, when the failure came from one
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            FhError::Listing { source, .. }
            | FhError::Creation { source, .. }
            | FhError::Deletion { source, .. }
            | FhError::Move { source, .. }
            | FhError::Io { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.io_source()
            .map(|e| e.kind() == io::ErrorKind::NotFound)
            .unwrap_or(false)
    }
}
