// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Blocked addressing never lands outside the stored region.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spectrastore::DatasetLayout;

#[derive(Debug, Arbitrary)]
struct Input {
    dims: Vec<(u8, u8, u8)>,
}

fuzz_target!(|input: Input| {
    // (extent, block, index) per dimension, all made valid.
    let dims: Vec<(usize, usize, usize)> = input
        .dims
        .iter()
        .take(6)
        .map(|&(size, block, index)| {
            let size = size as usize + 1;
            let block = block as usize % size + 1;
            (size, block, index as usize % size)
        })
        .collect();
    if dims.is_empty() {
        return;
    }
    let sizes: Vec<usize> = dims.iter().map(|d| d.0).collect();
    let blocks: Vec<usize> = dims.iter().map(|d| d.1).collect();
    let indices: Vec<usize> = dims.iter().map(|d| d.2).collect();

    let layout = DatasetLayout::blocked(&sizes, &blocks);
    assert!(layout.point_offset(&indices) < layout.stored_point_count());
});
