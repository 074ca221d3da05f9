// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Dataset identity: the name a dataset is known by and the file (if any)
//! currently backing it.
//!
//! A dataset created in memory has a file name but no file. The first time
//! it has to spill to disk, the resize engine creates the file at the
//! canonical form of that name and records it here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::header::DatasetFormat;

/// Name and backing file of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    file_name: PathBuf,
    file: Option<PathBuf>,
}

impl Dataset {
    /// Dataset known by `file_name` with no backing file yet.
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            file: None,
        }
    }

    /// Dataset already stored in the file at `path`.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            file_name: path.clone(),
            file: Some(path),
        }
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Current backing file.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub(crate) fn set_file(&mut self, path: PathBuf) {
        self.file = Some(path);
    }

    /// Container format implied by the dataset's name.
    pub fn format(&self) -> DatasetFormat {
        DatasetFormat::from_path(&self.file_name)
    }

    /// Absolute path with symlinks resolved.
    ///
    /// The backing file is canonicalized if there is one; otherwise the
    /// parent directory of the file name is (the file itself need not exist).
    pub fn canonical_path(&self) -> io::Result<PathBuf> {
        if let Some(file) = &self.file {
            return fs::canonicalize(file);
        }
        let name = self.file_name.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", self.file_name.display()),
            )
        })?;
        let parent = match self.file_name.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(fs::canonicalize(parent)?.join(name))
    }
}
