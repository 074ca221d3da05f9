// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Group indices: compact selections of phase-cycled row pairs.
//!
//! A group index holds one entry per dimension. A non-negative entry `v`
//! names a *pair* of rows, `{2v, 2v + 1}`; `-1` is a wildcard meaning "all
//! rows of this dimension". Expanding a group gives every combination of
//! pair members, `2^n` index vectors for `n` dimensions:
//!
//! ```text
//! [1, -1, 0]  →  [2,-1,0] [2,-1,1] [3,-1,0] [3,-1,1]   (wildcard dims still
//!                                                      count toward 2^n)
//! ```
//!
//! Processing scripts name groups 1-based, so [`GroupIndex::to_index_string`]
//! and [`skip_string`] add one to every non-negative entry.

use std::fmt;

use crate::counter::DimCounter;

/// Entry value meaning "every row of this dimension".
pub const WILDCARD: i32 = -1;

/// Rows per group along each dimension.
const GROUP_WIDTH: usize = 2;

/// Per-dimension group selection plus a group tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupIndex {
    indices: Vec<i32>,
    group_index: i32,
}

impl GroupIndex {
    /// Group over a copy of `indices`.
    pub fn new(indices: &[i32], group_index: i32) -> Self {
        Self {
            indices: indices.to_vec(),
            group_index,
        }
    }

    pub fn indices(&self) -> &[i32] {
        &self.indices
    }

    pub fn group_index(&self) -> i32 {
        self.group_index
    }

    /// Concrete row indices this group denotes.
    ///
    /// Vectors come out in [`DimCounter`] order (last dimension fastest).
    /// Wildcard entries stay `-1` in every vector.
    pub fn group_to_indices(&self) -> Vec<Vec<i32>> {
        let widths = vec![GROUP_WIDTH; self.indices.len()];
        DimCounter::new(&widths)
            .map(|counts| {
                self.indices
                    .iter()
                    .zip(&counts)
                    .map(|(&index, &count)| {
                        if index >= 0 {
                            index * GROUP_WIDTH as i32 + count as i32
                        } else {
                            WILDCARD
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Comma-joined entries, 1-based; wildcards stay `-1`.
    pub fn to_index_string(&self) -> String {
        self.indices
            .iter()
            .map(|&index| {
                let shown = if index >= 0 { index + 1 } else { index };
                shown.to_string()
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for GroupIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_index_string(), self.group_index)
    }
}

/// Skip list for the processing front end: `[1,2],[3,-1]`.
///
/// Returns `None` for an empty collection.
pub fn skip_string<'a, I>(groups: I) -> Option<String>
where
    I: IntoIterator<Item = &'a GroupIndex>,
{
    let parts: Vec<String> = groups
        .into_iter()
        .map(|group| format!("[{}]", group.to_index_string()))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}
