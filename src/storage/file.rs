// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! File-backed backend.
//!
//! The file is `header | data`, where the header size is fixed by the
//! container format and data is big-endian `f32` in layout order. Element
//! `indices` lives at `header_size + layout.byte_offset(indices)`.
//!
//! The header is parsed once on open and cached; `write_header` pushes the
//! cached copy back to disk.
//!
//! Element reads and writes go through a single [`PAGE_SIZE`] page of the
//! data region. A dirty page is written back when another page is needed,
//! and on `flush`, `sync`, `close` and drop. Walking elements in storage
//! order ([`DatasetLayout::storage_order`]) touches each page once.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::contracts::used_after_close;
use crate::error::{StorageError, StorageResult};
use crate::header::{DatasetFormat, DatasetHeader};
use crate::layout::DatasetLayout;

use super::DatasetStorage;

/// Bytes of the data region cached per page. A multiple of the element size,
/// so no element straddles two pages.
pub const PAGE_SIZE: u64 = 64 * 1024;

/// Cached slice of the data region.
#[derive(Debug)]
struct Page {
    /// Offset within the data region.
    start: u64,
    bytes: Vec<u8>,
    dirty: bool,
}

/// Dataset stored in an open random-access file.
#[derive(Debug)]
pub struct FileStorage {
    file: Option<File>,
    path: PathBuf,
    header: DatasetHeader,
    page: Option<Page>,
}

impl FileStorage {
    /// Create (or truncate) `path` as a zero-filled dataset in the format its
    /// name implies.
    pub fn create(path: &Path, layout: DatasetLayout) -> StorageResult<Self> {
        Self::create_with_format(path, DatasetFormat::from_path(path), layout)
    }

    /// Create (or truncate) `path` as a zero-filled dataset in `format`.
    ///
    /// The format is explicit so a temporary file can be written in the
    /// format of the file it will replace.
    pub fn create_with_format(
        path: &Path,
        format: DatasetFormat,
        layout: DatasetLayout,
    ) -> StorageResult<Self> {
        let header = DatasetHeader::new(format, layout)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| StorageError::Create {
                path: path.to_path_buf(),
                source,
            })?;

        let mut storage = Self {
            file: Some(file),
            path: path.to_path_buf(),
            header,
            page: None,
        };
        storage.write_header(true)?;
        storage.extend_data_region()?;
        tracing::debug!(
            path = %path.display(),
            format = %format,
            sizes = ?storage.header.layout.sizes(),
            "created dataset file"
        );
        Ok(storage)
    }

    /// Open an existing NV or UCSF dataset, reading its geometry from the header.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let format = DatasetFormat::from_path(path);
        if format == DatasetFormat::Raw {
            return Err(StorageError::UnsupportedFormat {
                format,
                reason: "raw files carry no header; use FileStorage::open_raw".to_string(),
            });
        }
        let mut file = Self::open_rw(path)?;
        let mut bytes = vec![0u8; format.header_size() as usize];
        file.read_exact(&mut bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                StorageError::invalid_header(format!("{} is shorter than its header", path.display()))
            } else {
                StorageError::Io(e)
            }
        })?;
        let header = DatasetHeader::decode(format, &bytes)?;
        Self::from_parts(file, path, header)
    }

    /// Open an existing headerless file with a caller-supplied layout.
    pub fn open_raw(path: &Path, layout: DatasetLayout) -> StorageResult<Self> {
        let file = Self::open_rw(path)?;
        let header = DatasetHeader::new(DatasetFormat::Raw, layout)?;
        Self::from_parts(file, path, header)
    }

    fn open_rw(path: &Path) -> StorageResult<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| StorageError::Open {
                path: path.to_path_buf(),
                source,
            })
    }

    fn from_parts(file: File, path: &Path, header: DatasetHeader) -> StorageResult<Self> {
        let expected = header.size() + header.layout.byte_count();
        let actual = file.metadata()?.len();
        if actual < expected {
            return Err(StorageError::invalid_header(format!(
                "{} holds {} bytes but its layout needs {}",
                path.display(),
                actual,
                expected
            )));
        }
        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            header,
            page: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DatasetFormat {
        self.header.format
    }

    pub fn header(&self) -> &DatasetHeader {
        &self.header
    }

    /// Record that the open file now lives at `path` (after a rename).
    pub(crate) fn relocate(&mut self, path: &Path) {
        self.path = path.to_path_buf();
    }

    /// Write the cached page back if it holds unwritten elements.
    pub fn flush(&mut self) -> StorageResult<()> {
        if let Some(mut page) = self.page.take() {
            let written = self.write_page(&page);
            if written.is_ok() {
                page.dirty = false;
            }
            self.page = Some(page);
            written?;
        }
        Ok(())
    }

    /// Flush data and metadata to disk.
    pub fn sync(&mut self) -> StorageResult<()> {
        self.flush()?;
        self.handle().sync_all()?;
        Ok(())
    }

    fn handle(&mut self) -> &mut File {
        match self.file.as_mut() {
            Some(file) => file,
            None => used_after_close(format_args!("dataset file {}", self.path.display())),
        }
    }

    /// The page holding data byte `offset`, loading it if needed.
    fn page_at(&mut self, offset: u64) -> StorageResult<&mut Page> {
        let start = offset - offset % PAGE_SIZE;
        let page = match self.page.take() {
            Some(page) if page.start == start => page,
            previous => {
                if let Some(old) = previous {
                    if let Err(e) = self.write_page(&old) {
                        self.page = Some(old);
                        return Err(e);
                    }
                }
                self.read_page(start)?
            }
        };
        Ok(self.page.insert(page))
    }

    fn read_page(&mut self, start: u64) -> StorageResult<Page> {
        let len = PAGE_SIZE.min(self.header.layout.byte_count() - start) as usize;
        let pos = self.header.size() + start;
        let mut bytes = vec![0u8; len];
        let file = self.handle();
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut bytes)?;
        Ok(Page {
            start,
            bytes,
            dirty: false,
        })
    }

    fn write_page(&mut self, page: &Page) -> StorageResult<()> {
        if !page.dirty {
            return Ok(());
        }
        let pos = self.header.size() + page.start;
        let file = self.handle();
        file.seek(SeekFrom::Start(pos))?;
        file.write_all(&page.bytes)?;
        Ok(())
    }

    fn extend_data_region(&mut self) -> StorageResult<()> {
        let len = self.header.size() + self.header.layout.byte_count();
        self.handle().set_len(len)?;
        Ok(())
    }
}

impl DatasetStorage for FileStorage {
    fn layout(&self) -> &DatasetLayout {
        &self.header.layout
    }

    fn get_float(&mut self, indices: &[usize]) -> StorageResult<f32> {
        let offset = self.header.layout.byte_offset(indices);
        let page = self.page_at(offset)?;
        let at = (offset - page.start) as usize;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&page.bytes[at..at + 4]);
        Ok(f32::from_be_bytes(buf))
    }

    fn set_float(&mut self, value: f32, indices: &[usize]) -> StorageResult<()> {
        let offset = self.header.layout.byte_offset(indices);
        let page = self.page_at(offset)?;
        let at = (offset - page.start) as usize;
        page.bytes[at..at + 4].copy_from_slice(&value.to_be_bytes());
        page.dirty = true;
        Ok(())
    }

    fn zero(&mut self) -> StorageResult<()> {
        self.page = None;
        // Truncating to the header and growing back leaves a zero-filled data region.
        let header_size = self.header.size();
        self.handle().set_len(header_size)?;
        self.extend_data_region()
    }

    fn write_header(&mut self, force_full_rewrite: bool) -> StorageResult<()> {
        let bytes = self.header.encode();
        let len = if force_full_rewrite {
            bytes.len()
        } else {
            self.header.significant_len()
        };
        let file = self.handle();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes[..len])?;
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.file.is_none() {
            return Ok(());
        }
        self.flush()?;
        self.page = None;
        if let Some(file) = self.file.take() {
            file.sync_all()?;
            tracing::debug!(path = %self.path.display(), "closed dataset file");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(e) = self.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to write back cached page");
            }
        }
    }
}
