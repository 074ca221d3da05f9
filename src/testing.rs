//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical implementations of test helpers to avoid duplication.

#![doc(hidden)]

use std::fs;
use std::io;
use std::path::Path;

use crate::counter::DimCounter;
use crate::error::StorageResult;
use crate::layout::DatasetLayout;
use crate::storage::{DatasetStorage, FileStorage};

/// Deterministic, nonzero value for an index vector.
///
/// Distinct index vectors of small datasets map to distinct values, so a
/// value read back at the wrong position is caught.
pub fn pattern_value(indices: &[usize]) -> f32 {
    indices
        .iter()
        .fold(1.0f32, |acc, &index| acc * 31.0 + index as f32)
}

/// Write [`pattern_value`] to every element of `storage`.
pub fn fill_with_pattern<S: DatasetStorage + ?Sized>(storage: &mut S) -> StorageResult<()> {
    let sizes = storage.layout().sizes().to_vec();
    for indices in DimCounter::new(&sizes) {
        storage.set_float(pattern_value(&indices), &indices)?;
    }
    Ok(())
}

/// Create a closed, pattern-filled dataset file at `path`.
pub fn write_pattern_file(path: &Path, layout: DatasetLayout) -> StorageResult<()> {
    let mut storage = FileStorage::create(path, layout)?;
    fill_with_pattern(&mut storage)?;
    storage.close()
}

/// Flip one bit of the byte at `offset`.
pub fn corrupt_byte(path: &Path, offset: usize) -> io::Result<()> {
    let mut bytes = fs::read(path)?;
    bytes[offset] ^= 0x01;
    fs::write(path, bytes)
}

/// Big-endian `f32` bytes, the on-disk data encoding.
pub fn float_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}
