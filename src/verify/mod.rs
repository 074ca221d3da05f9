// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary verification of dataset files against golden references.
//!
//! Three levels of strictness:
//!
//! | Function            | Unit   | Reports                                   |
//! |---------------------|--------|-------------------------------------------|
//! | `compare`           | byte   | first differing offset                    |
//! | `compare_detailed`  | byte   | first offset in header and in data        |
//! | `compare_float`     | `f32`  | first differing element index             |
//!
//! All three check lengths first and report the shorter length when they
//! differ. [`compare_directories`] runs `compare_detailed` over every file
//! of a reference directory.

mod streaming;
mod types;

use std::fs;
use std::io;
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::VerifyConfig;

pub use streaming::{compare, compare_detailed, compare_detailed_with, compare_float, floats_match};
pub use types::*;

/// Compare every regular file of `ref_dir` with its namesake in `test_dir`.
pub fn compare_directories(ref_dir: &Path, test_dir: &Path) -> io::Result<Vec<FileComparison>> {
    compare_directories_with(&VerifyConfig::default(), ref_dir, test_dir, |_| {})
}

/// [`compare_directories`] with explicit header sizes and a callback invoked
/// as each file finishes (from worker threads when `parallel` is on).
///
/// Results are sorted by file name. Files that exist only in `test_dir` are
/// ignored.
pub fn compare_directories_with<F>(
    config: &VerifyConfig,
    ref_dir: &Path,
    test_dir: &Path,
    on_file: F,
) -> io::Result<Vec<FileComparison>>
where
    F: Fn(&FileComparison) + Sync,
{
    let names = reference_files(ref_dir)?;
    tracing::debug!(
        reference = %ref_dir.display(),
        test = %test_dir.display(),
        files = names.len(),
        "comparing directories"
    );

    let compare_one = |name: String| {
        let reference = ref_dir.join(&name);
        let test = test_dir.join(&name);
        let outcome = if !test.is_file() {
            FileOutcome::MissingInTest
        } else {
            match compare_detailed_with(config, &reference, &test) {
                Ok(detail) if detail.is_equal() => FileOutcome::Match,
                Ok(detail) => FileOutcome::Mismatch(detail),
                Err(e) => FileOutcome::Error {
                    message: e.to_string(),
                },
            }
        };
        let comparison = FileComparison { name, outcome };
        on_file(&comparison);
        comparison
    };

    #[cfg(feature = "parallel")]
    let results: Vec<FileComparison> = names.into_par_iter().map(compare_one).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<FileComparison> = names.into_iter().map(compare_one).collect();

    Ok(results)
}

/// Number of reference files a directory comparison will visit.
pub fn count_reference_files(ref_dir: &Path) -> io::Result<usize> {
    Ok(reference_files(ref_dir)?.len())
}

fn reference_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => tracing::warn!(?name, "skipping file with non UTF-8 name"),
        }
    }
    names.sort();
    Ok(names)
}
