// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Iteration over the cartesian product of per-dimension extents.
//!
//! `DimCounter::new(&[2, 3])` yields
//!
//! ```text
//! [0,0] [0,1] [0,2] [1,0] [1,1] [1,2]
//! ```
//!
//! The LAST dimension varies fastest. The group expander relies on this
//! order, and [`DatasetLayout::storage_order`] inverts it by counting over
//! reversed extents; do not change it.
//!
//! [`DatasetLayout::storage_order`]: crate::layout::DatasetLayout::storage_order
//!
//! A counter is a single traversal. To start over, build a new one.

/// Lazy, finite iterator over every index vector below `extents`.
#[derive(Debug, Clone)]
pub struct DimCounter {
    extents: Vec<usize>,
    current: Vec<usize>,
    remaining: u64,
}

impl DimCounter {
    /// Counter over `extents`. An empty extents vector, or any zero extent,
    /// yields nothing.
    pub fn new(extents: &[usize]) -> Self {
        let remaining = if extents.is_empty() {
            0
        } else {
            Self::product(extents)
        };
        Self {
            extents: extents.to_vec(),
            current: vec![0; extents.len()],
            remaining,
        }
    }

    /// Total number of combinations (`∏ extents`).
    pub fn total(&self) -> u64 {
        if self.extents.is_empty() {
            0
        } else {
            Self::product(&self.extents)
        }
    }

    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    fn product(extents: &[usize]) -> u64 {
        extents.iter().map(|&e| e as u64).product()
    }

    fn advance(&mut self) {
        for dim in (0..self.current.len()).rev() {
            self.current[dim] += 1;
            if self.current[dim] < self.extents[dim] {
                return;
            }
            self.current[dim] = 0;
        }
    }
}

impl Iterator for DimCounter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.remaining == 0 {
            return None;
        }
        let counts = self.current.clone();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(counts)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl ExactSizeIterator for DimCounter {}
