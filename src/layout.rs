// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Dataset geometry: extents, block tiling and element addressing.
//!
//! A layout is either a *full matrix* (one block covering every extent) or a
//! *blocked* layout where the index space is cut into equally sized tiles.
//! Tiles at the upper edge are padded, so a blocked layout may store more
//! points than it exposes.
//!
//! ```text
//! sizes = [6, 4], block_sizes = [4, 2]  →  n_blocks = [2, 2]
//!
//!   dim 1
//!     ^   ┌───────┬───────┐
//!     3   │ blk 2 │ blk 3 │   each block stores 4 × 2 = 8 points,
//!     2   │       │  pad  │   dimension 0 fastest inside a block;
//!     1   ├───────┼───────┤   blocks themselves are numbered with
//!     0   │ blk 0 │ blk 1 │   dimension 0 fastest as well
//!         └───────┴───────┘
//!          0 .. 3  4 .. 7  > dim 0
//! ```
//!
//! A full matrix is the degenerate case `block_sizes == sizes`, for which
//! [`DatasetLayout::point_offset`] reduces to ordinary strided addressing.
//! Layouts are values: [`DatasetLayout::resize`] returns a new one.

use serde::Serialize;

use crate::contracts::{check_block_sizes, check_extents, check_indices, check_same_rank};
use crate::counter::DimCounter;

/// Bytes per stored element (IEEE-754 single precision).
pub const BYTES_PER_POINT: u64 = 4;

/// Geometry of an N-dimensional dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DatasetLayout {
    sizes: Vec<usize>,
    block_sizes: Vec<usize>,
    n_blocks: Vec<usize>,
    full_matrix: bool,
}

impl DatasetLayout {
    /// Dense single-block layout over `sizes`.
    ///
    /// # Panics
    /// Panics if `sizes` is empty or contains a zero extent.
    pub fn full_matrix(sizes: &[usize]) -> Self {
        check_extents(sizes);
        Self::build(sizes.to_vec(), sizes.to_vec(), true)
    }

    /// Tiled layout over `sizes` with the given block sizes.
    ///
    /// If every block covers its whole extent the result is a full matrix.
    ///
    /// # Panics
    /// Panics on a zero extent or a block size outside `1..=size`.
    pub fn blocked(sizes: &[usize], block_sizes: &[usize]) -> Self {
        check_extents(sizes);
        check_block_sizes(sizes, block_sizes);
        let full_matrix = sizes == block_sizes;
        Self::build(sizes.to_vec(), block_sizes.to_vec(), full_matrix)
    }

    /// Non-panicking constructor for geometry read from untrusted bytes.
    pub(crate) fn try_blocked(sizes: &[usize], block_sizes: &[usize]) -> Result<Self, String> {
        if sizes.is_empty() {
            return Err("layout has no dimensions".to_string());
        }
        if sizes.len() != block_sizes.len() {
            return Err(format!(
                "{} block sizes for {} dimensions",
                block_sizes.len(),
                sizes.len()
            ));
        }
        for (dim, (&size, &block)) in sizes.iter().zip(block_sizes).enumerate() {
            if size == 0 {
                return Err(format!("dimension {} has zero extent", dim));
            }
            if block == 0 || block > size {
                return Err(format!(
                    "block size {} of dimension {} not in 1..={}",
                    block, dim, size
                ));
            }
        }
        if stored_bytes(sizes, block_sizes).is_none() {
            return Err("layout exceeds the addressable byte range".to_string());
        }
        Ok(Self::build(sizes.to_vec(), block_sizes.to_vec(), sizes == block_sizes))
    }

    /// Layout of the same kind as `old` with new extents.
    ///
    /// A full matrix stays a full matrix. A blocked layout keeps its block
    /// sizes, clamped to the new extents. Every index vector of `old` that lies
    /// inside `new_sizes` addresses the same logical element in the result.
    ///
    /// # Panics
    /// Panics if the number of dimensions changes or an extent is zero.
    pub fn resize(old: &DatasetLayout, new_sizes: &[usize]) -> Self {
        check_same_rank(old.n_dim(), new_sizes);
        if old.full_matrix {
            return Self::full_matrix(new_sizes);
        }
        check_extents(new_sizes);
        let block_sizes: Vec<usize> = old
            .block_sizes
            .iter()
            .zip(new_sizes)
            .map(|(&block, &size)| block.min(size))
            .collect();
        Self::blocked(new_sizes, &block_sizes)
    }

    fn build(sizes: Vec<usize>, block_sizes: Vec<usize>, full_matrix: bool) -> Self {
        assert!(
            stored_bytes(&sizes, &block_sizes).is_some(),
            "Contract violation: layout {:?} exceeds the addressable byte range",
            sizes
        );
        let n_blocks = sizes
            .iter()
            .zip(&block_sizes)
            .map(|(&size, &block)| size.div_ceil(block))
            .collect();
        Self {
            sizes,
            block_sizes,
            n_blocks,
            full_matrix,
        }
    }

    pub fn n_dim(&self) -> usize {
        self.sizes.len()
    }

    pub fn size(&self, dim: usize) -> usize {
        self.sizes[dim]
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn block_size(&self, dim: usize) -> usize {
        self.block_sizes[dim]
    }

    pub fn block_sizes(&self) -> &[usize] {
        &self.block_sizes
    }

    pub fn n_blocks(&self, dim: usize) -> usize {
        self.n_blocks[dim]
    }

    pub fn is_full_matrix(&self) -> bool {
        self.full_matrix
    }

    /// Number of logical elements: the product of the extents.
    pub fn point_count(&self) -> u64 {
        self.sizes.iter().map(|&s| s as u64).product()
    }

    /// Points in one block.
    pub fn block_point_count(&self) -> u64 {
        self.block_sizes.iter().map(|&s| s as u64).product()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> u64 {
        self.n_blocks.iter().map(|&n| n as u64).product()
    }

    /// Points actually stored, including padding in edge blocks.
    pub fn stored_point_count(&self) -> u64 {
        self.block_count() * self.block_point_count()
    }

    /// Bytes needed to store the data region.
    pub fn byte_count(&self) -> u64 {
        self.stored_point_count() * BYTES_PER_POINT
    }

    /// Whether `indices` lies inside the extents.
    pub fn contains(&self, indices: &[usize]) -> bool {
        indices.len() == self.sizes.len() && indices.iter().zip(&self.sizes).all(|(i, s)| i < s)
    }

    /// Element offset of `indices` in storage order.
    ///
    /// # Panics
    /// Panics if `indices` is outside the layout.
    pub fn point_offset(&self, indices: &[usize]) -> u64 {
        check_indices(indices, &self.sizes);

        let mut block_number = 0u64;
        let mut within = 0u64;
        let mut block_stride = 1u64;
        let mut point_stride = 1u64;
        for dim in 0..self.sizes.len() {
            let block = self.block_sizes[dim];
            let index = indices[dim];
            block_number += (index / block) as u64 * block_stride;
            within += (index % block) as u64 * point_stride;
            block_stride *= self.n_blocks[dim] as u64;
            point_stride *= block as u64;
        }
        block_number * self.block_point_count() + within
    }

    /// Byte offset of `indices` within the data region.
    pub fn byte_offset(&self, indices: &[usize]) -> u64 {
        self.point_offset(indices) * BYTES_PER_POINT
    }

    /// Per-dimension minimum of this layout's extents and `other`'s.
    pub fn overlap(&self, other: &DatasetLayout) -> Vec<usize> {
        self.sizes
            .iter()
            .zip(&other.sizes)
            .map(|(&a, &b)| a.min(b))
            .collect()
    }

    /// Every index vector in the order its element is stored: block by block,
    /// dimension 0 fastest at both levels. Padding points are skipped, so
    /// offsets strictly increase along the iteration.
    pub fn storage_order(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        // DimCounter runs the last dimension fastest, so count over reversed
        // extents and flip back.
        let block_counts: Vec<usize> = self.n_blocks.iter().rev().copied().collect();
        let block_extents: Vec<usize> = self.block_sizes.iter().rev().copied().collect();
        DimCounter::new(&block_counts).flat_map(move |block| {
            DimCounter::new(&block_extents).filter_map(move |point| {
                let rank = self.sizes.len();
                let mut indices = Vec::with_capacity(rank);
                for dim in 0..rank {
                    let rev = rank - 1 - dim;
                    let index = block[rev] * self.block_sizes[dim] + point[rev];
                    if index >= self.sizes[dim] {
                        return None;
                    }
                    indices.push(index);
                }
                Some(indices)
            })
        })
    }
}

/// Stored byte count for the geometry, or `None` if it overflows `u64`.
fn stored_bytes(sizes: &[usize], block_sizes: &[usize]) -> Option<u64> {
    sizes
        .iter()
        .zip(block_sizes)
        .try_fold(BYTES_PER_POINT, |acc, (&size, &block)| {
            let padded = (size.div_ceil(block) as u64).checked_mul(block as u64)?;
            acc.checked_mul(padded)
        })
}
