//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use spectrastore::{DatasetLayout, DatasetStorage, DimCounter, FileStorage};

// Re-export canonical test utilities from spectrastore::testing
pub use spectrastore::testing::{corrupt_byte, fill_with_pattern, float_bytes, pattern_value};

// ============================================================================
// FIXTURES
// ============================================================================

/// Pattern-filled, closed dataset file `name` inside `dir`.
pub fn pattern_file(dir: &Path, name: &str, layout: DatasetLayout) -> PathBuf {
    let path = dir.join(name);
    spectrastore::testing::write_pattern_file(&path, layout).expect("write pattern file");
    path
}

/// Same file name under two sibling directories, `ref/` and `test/`.
pub fn reference_pair(dir: &Path, name: &str, layout: DatasetLayout) -> (PathBuf, PathBuf) {
    let ref_dir = dir.join("ref");
    let test_dir = dir.join("test");
    std::fs::create_dir_all(&ref_dir).unwrap();
    std::fs::create_dir_all(&test_dir).unwrap();
    let reference = pattern_file(&ref_dir, name, layout.clone());
    let test = pattern_file(&test_dir, name, layout);
    (reference, test)
}

// ============================================================================
// ASSERTIONS
// ============================================================================

/// Every element inside `old_sizes` holds its pattern value, every other
/// element of `storage` holds 0.0.
pub fn assert_pattern_preserved<S: DatasetStorage + ?Sized>(storage: &mut S, old_sizes: &[usize]) {
    let sizes = storage.layout().sizes().to_vec();
    for indices in DimCounter::new(&sizes) {
        let inside = indices.iter().zip(old_sizes).all(|(&i, &s)| i < s);
        let expected = if inside { pattern_value(&indices) } else { 0.0 };
        let actual = storage.get_float(&indices).unwrap();
        assert_eq!(
            actual, expected,
            "element {:?} after resize {:?} -> {:?}",
            indices, old_sizes, sizes
        );
    }
}

/// Reopen a dataset file and check its geometry.
pub fn reopen(path: &Path, expected_sizes: &[usize]) -> FileStorage {
    let storage = FileStorage::open(path).expect("reopen dataset");
    assert_eq!(storage.layout().sizes(), expected_sizes);
    storage
}
