// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Changing a dataset's extents while keeping its data.
//!
//! ```text
//!  source backend ──copy_to──▶ target backend
//!                                   │
//!        in memory & small? ────────┤ yes: MemoryStorage
//!                                   │ no:  FileStorage
//!                                   │        no file yet → <canonical path>
//!                                   │        file exists → <canonical path>.tmp
//!                                   │   (or source reads it)
//!                                   ▼
//!            .tmp used? close source, rename .tmp over original,
//!                       rewrite full header at the original path
//! ```
//!
//! The rename is the only step that touches the original file, and it runs
//! only after every element has been copied. If anything fails earlier the
//! temporary file is removed and the original is exactly as it was.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::StorageConfig;
use crate::dataset::Dataset;
use crate::error::{StorageError, StorageResult};
use crate::layout::{DatasetLayout, BYTES_PER_POINT};
use crate::storage::{DatasetStorage, FileStorage, MemoryStorage, StorageBackend};

/// Suffix of the sibling file a resize writes before replacing the original.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Resize with the default [`StorageConfig`].
///
/// See [`resize_dim_with`].
pub fn resize_dim(
    dataset: &mut Dataset,
    source_layout: &DatasetLayout,
    source: &mut StorageBackend,
    new_sizes: &[usize],
) -> StorageResult<StorageBackend> {
    resize_dim_with(&StorageConfig::default(), dataset, source_layout, source, new_sizes)
}

/// Build a new backend with extents `new_sizes` holding `source`'s data.
///
/// Elements inside both the old and the new extents keep their values;
/// elements only in the new extents read as 0.0. The caller must make the
/// returned backend the dataset's active one. If a temporary file replaced
/// the original, `source` has been closed; otherwise it is left open.
///
/// # Panics
/// Panics if `new_sizes` has a different rank than `source_layout` or a
/// zero extent.
pub fn resize_dim_with(
    config: &StorageConfig,
    dataset: &mut Dataset,
    source_layout: &DatasetLayout,
    source: &mut StorageBackend,
    new_sizes: &[usize],
) -> StorageResult<StorageBackend> {
    let target_layout = DatasetLayout::resize(source_layout, new_sizes);
    let target_bytes = target_layout.point_count() * BYTES_PER_POINT;
    tracing::debug!(
        dataset = %dataset.file_name().display(),
        from = ?source_layout.sizes(),
        to = ?target_layout.sizes(),
        bytes = target_bytes,
        "resizing dataset"
    );

    if source.is_in_memory() && config.fits_in_memory(target_bytes) {
        let mut target = MemoryStorage::new(target_layout);
        target.zero()?;
        copy_to(source_layout, source, &mut target)?;
        return Ok(target.into());
    }

    let canonical = dataset.canonical_path()?;
    // Creating the target truncates its path, so a source reading the
    // canonical file must be replaced through the temp file as well.
    let replacing = dataset.file().is_some() || reads_from(source, &canonical);
    let target_path = if replacing {
        temp_path(&canonical)
    } else {
        canonical.clone()
    };

    let mut target = FileStorage::create_with_format(&target_path, dataset.format(), target_layout)?;
    let copied = target
        .zero()
        .and_then(|()| copy_to(source_layout, source, &mut target))
        .and_then(|()| target.flush());
    if let Err(e) = copied {
        discard(target, &target_path);
        return Err(e);
    }

    if replacing {
        if let Err(e) = source.close() {
            discard(target, &target_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&target_path, &canonical) {
            discard(target, &target_path);
            return Err(StorageError::Replace {
                from: target_path,
                to: canonical,
                source: e,
            });
        }
        target.relocate(&canonical);
        target.write_header(true)?;
        if dataset.file().is_none() {
            dataset.set_file(canonical.clone());
        }
        tracing::info!(path = %canonical.display(), "replaced dataset file with resized copy");
    } else {
        dataset.set_file(canonical);
    }
    Ok(target.into())
}

/// Copy every element of `source` that also lies inside `target`.
///
/// Walks the source in storage order, skipping elements outside the overlap
/// of both extents (none when growing), and writes each value to the same
/// index vector in the target. File sources are read front to back.
pub fn copy_to<S, T>(source_layout: &DatasetLayout, source: &mut S, target: &mut T) -> StorageResult<()>
where
    S: DatasetStorage + ?Sized,
    T: DatasetStorage + ?Sized,
{
    let extents = source_layout.overlap(target.layout());
    for indices in source_layout.storage_order() {
        if indices.iter().zip(&extents).any(|(&i, &e)| i >= e) {
            continue;
        }
        let value = source.get_float(&indices)?;
        target.set_float(value, &indices)?;
    }
    Ok(())
}

/// `<path>.tmp`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Whether `source` is backed by the file at the canonical path `path`.
fn reads_from(source: &StorageBackend, path: &Path) -> bool {
    source
        .file_path()
        .and_then(|p| fs::canonicalize(p).ok())
        .is_some_and(|p| p == path)
}

fn discard(mut target: FileStorage, path: &Path) {
    if let Err(e) = target.close() {
        tracing::warn!(path = %path.display(), error = %e, "failed to close partial resize target");
    }
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove partial resize target");
    }
}

// ============================================================================
// BATCH RESIZE
// ============================================================================

/// One dataset to resize. The job owns everything it touches.
#[derive(Debug)]
pub struct ResizeJob {
    pub dataset: Dataset,
    pub layout: DatasetLayout,
    pub backend: StorageBackend,
    pub new_sizes: Vec<usize>,
}

/// Result of a [`ResizeJob`].
#[derive(Debug)]
pub struct ResizeOutcome {
    pub dataset: Dataset,
    /// The source backend; closed if its file was replaced.
    pub previous: StorageBackend,
    pub result: StorageResult<StorageBackend>,
}

/// Resize independent datasets, in parallel when the `parallel` feature is on.
pub fn resize_all(config: &StorageConfig, jobs: Vec<ResizeJob>) -> Vec<ResizeOutcome> {
    #[cfg(feature = "parallel")]
    let iter = jobs.into_par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = jobs.into_iter();

    iter.map(|job| run_job(config, job)).collect()
}

fn run_job(config: &StorageConfig, job: ResizeJob) -> ResizeOutcome {
    let ResizeJob {
        mut dataset,
        layout,
        mut backend,
        new_sizes,
    } = job;
    let result = resize_dim_with(config, &mut dataset, &layout, &mut backend, &new_sizes);
    ResizeOutcome {
        dataset,
        previous: backend,
        result,
    }
}
