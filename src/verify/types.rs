// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Comparison outcomes.
//!
//! A mismatch is a result, not an error: every outcome here is a plain value
//! that serializes to JSON for test harnesses and the `--json` CLI flag.

use serde::Serialize;
use std::fmt;

/// Outcome of a byte-exact comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    Equal,
    /// Lengths differ; carries the shorter one.
    Size { shorter_len: u64 },
    /// First differing byte.
    Content { offset: u64 },
}

impl Mismatch {
    pub fn is_equal(&self) -> bool {
        matches!(self, Mismatch::Equal)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Equal => write!(f, "files are identical"),
            Mismatch::Size { shorter_len } => {
                write!(f, "lengths differ (shorter file has {} bytes)", shorter_len)
            }
            Mismatch::Content { offset } => write!(f, "first difference at byte {}", offset),
        }
    }
}

/// Outcome of a comparison that separates the header region from the data.
///
/// All three fields are `None` for identical files. On a length difference
/// only `size_error` is set. Offsets are absolute file positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetailedMismatch {
    pub size_error: Option<u64>,
    pub data_offset: Option<u64>,
    pub header_offset: Option<u64>,
}

impl DetailedMismatch {
    pub fn is_equal(&self) -> bool {
        self.size_error.is_none() && self.data_offset.is_none() && self.header_offset.is_none()
    }
}

impl fmt::Display for DetailedMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_equal() {
            return write!(f, "files are identical");
        }
        if let Some(len) = self.size_error {
            return write!(f, "lengths differ (shorter file has {} bytes)", len);
        }
        let mut parts = Vec::with_capacity(2);
        if let Some(offset) = self.header_offset {
            parts.push(format!("header differs at byte {}", offset));
        }
        if let Some(offset) = self.data_offset {
            parts.push(format!("data differs at byte {}", offset));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Outcome of a float-by-float comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FloatMismatch {
    Equal,
    Size { shorter_len: u64 },
    /// Index of the first differing float (byte offset / 4).
    Element { index: u64 },
}

impl FloatMismatch {
    pub fn is_equal(&self) -> bool {
        matches!(self, FloatMismatch::Equal)
    }
}

impl fmt::Display for FloatMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatMismatch::Equal => write!(f, "all floats are equal"),
            FloatMismatch::Size { shorter_len } => {
                write!(f, "lengths differ (shorter file has {} bytes)", shorter_len)
            }
            FloatMismatch::Element { index } => write!(f, "first differing float at index {}", index),
        }
    }
}

/// Result for one file of a directory comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileComparison {
    pub name: String,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Match,
    Mismatch(DetailedMismatch),
    /// The reference file has no counterpart in the test directory.
    MissingInTest,
    Error { message: String },
}

impl FileOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, FileOutcome::Match)
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Match => write!(f, "match"),
            FileOutcome::Mismatch(detail) => write!(f, "{}", detail),
            FileOutcome::MissingInTest => write!(f, "missing in test directory"),
            FileOutcome::Error { message } => write!(f, "error: {}", message),
        }
    }
}
