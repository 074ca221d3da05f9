// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Storage backends: where a dataset's floats actually live.
//!
//! Two variants share one capability set ([`DatasetStorage`]):
//!
//! | Backend         | Holds                               | `write_header` |
//! |-----------------|-------------------------------------|----------------|
//! | `MemoryStorage` | `Vec<f32>` in storage order         | no-op          |
//! | `FileStorage`   | open file + cached [`DatasetHeader`]| rewrites bytes |
//!
//! [`StorageBackend`] is the closed enum callers hold. They should not care
//! which variant they have, except the resize engine, which needs to know
//! whether a file has to be swapped into place.
//!
//! Every backend is owned by exactly one caller. Reads take `&mut self`
//! because a file read moves the file cursor.
//!
//! [`DatasetHeader`]: crate::header::DatasetHeader

mod file;
mod memory;

use std::path::Path;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageResult;
use crate::layout::DatasetLayout;

/// Capability set shared by every backend.
///
/// Index vectors outside the layout, and any call other than `close` after
/// `close`, are contract violations and panic.
pub trait DatasetStorage {
    /// Geometry of the stored data.
    fn layout(&self) -> &DatasetLayout;

    /// Read one element.
    fn get_float(&mut self, indices: &[usize]) -> StorageResult<f32>;

    /// Write one element.
    fn set_float(&mut self, value: f32, indices: &[usize]) -> StorageResult<()>;

    /// Set every stored element to 0.0.
    fn zero(&mut self) -> StorageResult<()>;

    /// Persist header metadata. With `force_full_rewrite` the whole header
    /// region is rewritten, padding included; otherwise only the bytes that
    /// carry geometry.
    fn write_header(&mut self, force_full_rewrite: bool) -> StorageResult<()>;

    /// Release resources. A second call does nothing.
    fn close(&mut self) -> StorageResult<()>;

    fn is_closed(&self) -> bool;
}

/// The single live backend of a dataset.
#[derive(Debug)]
pub enum StorageBackend {
    Memory(MemoryStorage),
    File(FileStorage),
}

impl StorageBackend {
    pub fn is_in_memory(&self) -> bool {
        matches!(self, StorageBackend::Memory(_))
    }

    /// Backing file, if any.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Memory(_) => None,
            StorageBackend::File(f) => Some(f.path()),
        }
    }

    fn inner(&self) -> &dyn DatasetStorage {
        match self {
            StorageBackend::Memory(m) => m,
            StorageBackend::File(f) => f,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DatasetStorage {
        match self {
            StorageBackend::Memory(m) => m,
            StorageBackend::File(f) => f,
        }
    }
}

impl DatasetStorage for StorageBackend {
    fn layout(&self) -> &DatasetLayout {
        self.inner().layout()
    }

    fn get_float(&mut self, indices: &[usize]) -> StorageResult<f32> {
        self.inner_mut().get_float(indices)
    }

    fn set_float(&mut self, value: f32, indices: &[usize]) -> StorageResult<()> {
        self.inner_mut().set_float(value, indices)
    }

    fn zero(&mut self) -> StorageResult<()> {
        self.inner_mut().zero()
    }

    fn write_header(&mut self, force_full_rewrite: bool) -> StorageResult<()> {
        self.inner_mut().write_header(force_full_rewrite)
    }

    fn close(&mut self) -> StorageResult<()> {
        self.inner_mut().close()
    }

    fn is_closed(&self) -> bool {
        self.inner().is_closed()
    }
}

impl From<MemoryStorage> for StorageBackend {
    fn from(storage: MemoryStorage) -> Self {
        StorageBackend::Memory(storage)
    }
}

impl From<FileStorage> for StorageBackend {
    fn from(storage: FileStorage) -> Self {
        StorageBackend::File(storage)
    }
}
