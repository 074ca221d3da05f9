//! Caller contracts for layouts and backends.
//!
//! These checks guard the invariants every storage operation relies on:
//!
//! 1. Every extent of a layout is positive and every block fits its extent
//! 2. Every index vector has one entry per dimension, each inside its extent
//! 3. A backend is never used after it has been closed
//!
//! A violation means the caller has a bug. Unlike I/O failures these are not
//! recoverable, so they panic (in release builds too: a bad index on a
//! file-backed dataset would otherwise silently address another element).
//!
//! # Contract Table
//!
//! | Contract Function         | Guards                                  |
//! |---------------------------|-----------------------------------------|
//! | `check_extents`           | `DatasetLayout` construction            |
//! | `check_block_sizes`       | blocked layouts                         |
//! | `check_indices`           | `get_float` / `set_float`               |
//! | `check_same_rank`         | `DatasetLayout::resize`                 |
//! | `check_open`              | every backend operation except `close`  |

use std::fmt::Display;

// ============================================================================
// LAYOUT CONTRACTS
// ============================================================================

/// Check that a layout has at least one dimension and no empty extent.
///
/// # Panics
/// Panics if `sizes` is empty or any extent is zero.
#[inline]
pub fn check_extents(sizes: &[usize]) {
    assert!(
        !sizes.is_empty(),
        "Contract violation: layout must have at least one dimension"
    );
    for (dim, &size) in sizes.iter().enumerate() {
        assert!(
            size > 0,
            "Contract violation: extent of dimension {} must be positive, got {}",
            dim,
            size
        );
    }
}

/// Check that each block size is in `1..=size` for its dimension.
///
/// # Panics
/// Panics on a rank mismatch or a block that is empty or larger than its extent.
#[inline]
pub fn check_block_sizes(sizes: &[usize], block_sizes: &[usize]) {
    assert_eq!(
        sizes.len(),
        block_sizes.len(),
        "Contract violation: {} block sizes for a {}-dimensional layout",
        block_sizes.len(),
        sizes.len()
    );
    for (dim, (&size, &block)) in sizes.iter().zip(block_sizes).enumerate() {
        assert!(
            block > 0 && block <= size,
            "Contract violation: block size {} of dimension {} not in 1..={}",
            block,
            dim,
            size
        );
    }
}

/// Check that a resize keeps the number of dimensions.
#[inline]
pub fn check_same_rank(n_dim: usize, new_sizes: &[usize]) {
    assert_eq!(
        n_dim,
        new_sizes.len(),
        "Contract violation: cannot resize a {}-dimensional layout to {} dimensions",
        n_dim,
        new_sizes.len()
    );
}

// ============================================================================
// BACKEND CONTRACTS
// ============================================================================

/// Check that `indices` addresses an element inside `sizes`.
///
/// # Panics
/// Panics if the rank differs or any index is outside `[0, size)`.
#[inline]
pub fn check_indices(indices: &[usize], sizes: &[usize]) {
    assert_eq!(
        indices.len(),
        sizes.len(),
        "Contract violation: {} indices for a {}-dimensional dataset",
        indices.len(),
        sizes.len()
    );
    for (dim, (&index, &size)) in indices.iter().zip(sizes).enumerate() {
        assert!(
            index < size,
            "Contract violation: index {} out of range for dimension {} (size {})",
            index,
            dim,
            size
        );
    }
}

/// Check that a backend has not been closed.
#[inline]
pub fn check_open(closed: bool, what: impl Display) {
    if closed {
        used_after_close(what);
    }
}

/// Report use of a closed backend.
#[cold]
pub fn used_after_close(what: impl Display) -> ! {
    panic!("Contract violation: {} used after close", what)
}
