// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Recoverable storage errors.
//!
//! Only failures the caller can do something about live here: files that
//! could not be created, read, written or swapped into place, and headers
//! that do not parse. Caller bugs (indices out of range, zero extents, use
//! after close) are contract violations and panic instead; see
//! [`crate::contracts`].

use std::io;
use std::path::PathBuf;

use crate::header::DatasetFormat;

/// Result alias used throughout the storage engine.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors returned by backends, the resize engine and header decoding.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to replace {to} with {from}: {source}")]
    Replace {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid dataset header: {reason}")]
    InvalidHeader { reason: String },

    #[error("{format} files do not support this operation: {reason}")]
    UnsupportedFormat {
        format: DatasetFormat,
        reason: String,
    },

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

impl StorageError {
    pub(crate) fn invalid_header(reason: impl Into<String>) -> Self {
        StorageError::InvalidHeader {
            reason: reason.into(),
        }
    }
}
