//! Layout and counter property tests.
//!
//! 1. **Coverage**: the counter visits every index vector exactly once, last
//!    dimension fastest
//! 2. **Bijection**: distinct index vectors map to distinct storage offsets,
//!    all below the stored point count
//! 3. **Storage order**: walking a layout in storage order visits every
//!    vector once with strictly increasing offsets
//! 4. **Headers**: encoding then decoding a header yields the same layout

use std::collections::HashSet;

use proptest::prelude::*;
use spectrastore::{DatasetFormat, DatasetHeader, DatasetLayout, DimCounter};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Extents of 1 to 4 dimensions, each small enough to enumerate.
fn extents_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..7, 1..=4)
}

/// Extents with a valid block size per dimension.
fn blocked_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    extents_strategy().prop_flat_map(|sizes| {
        let blocks: Vec<_> = sizes.iter().map(|&s| 1..=s).collect();
        (Just(sizes), blocks)
    })
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_counter_visits_every_vector_once(sizes in extents_strategy()) {
        let visited: Vec<Vec<usize>> = DimCounter::new(&sizes).collect();
        let expected: usize = sizes.iter().product();
        prop_assert_eq!(visited.len(), expected);

        let unique: HashSet<_> = visited.iter().cloned().collect();
        prop_assert_eq!(unique.len(), expected);

        // Lexicographic order == last dimension fastest.
        for pair in visited.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn prop_offsets_are_a_bijection((sizes, blocks) in blocked_strategy()) {
        let layout = DatasetLayout::blocked(&sizes, &blocks);
        let mut seen = HashSet::new();
        for indices in DimCounter::new(&sizes) {
            let offset = layout.point_offset(&indices);
            prop_assert!(offset < layout.stored_point_count());
            prop_assert!(seen.insert(offset), "offset {} reused by {:?}", offset, indices);
        }
    }

    #[test]
    fn prop_storage_order_is_sequential((sizes, blocks) in blocked_strategy()) {
        let layout = DatasetLayout::blocked(&sizes, &blocks);
        let offsets: Vec<u64> = layout
            .storage_order()
            .map(|indices| layout.point_offset(&indices))
            .collect();
        prop_assert_eq!(offsets.len() as u64, layout.point_count());
        for pair in offsets.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn prop_full_matrix_is_dense(sizes in extents_strategy()) {
        let layout = DatasetLayout::full_matrix(&sizes);
        prop_assert_eq!(layout.stored_point_count(), layout.point_count());
        let last: Vec<usize> = sizes.iter().map(|s| s - 1).collect();
        prop_assert_eq!(layout.point_offset(&last), layout.point_count() - 1);
    }

    #[test]
    fn prop_header_preserves_layout((sizes, blocks) in blocked_strategy(), nv in any::<bool>()) {
        let format = if nv { DatasetFormat::Nv } else { DatasetFormat::Ucsf };
        let layout = DatasetLayout::blocked(&sizes, &blocks);
        let header = DatasetHeader::new(format, layout.clone()).unwrap();
        let decoded = DatasetHeader::decode(format, &header.encode()).unwrap();
        prop_assert_eq!(decoded.layout, layout);
    }

    #[test]
    fn prop_header_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..800)) {
        let _ = DatasetHeader::decode(DatasetFormat::Nv, &bytes);
        let _ = DatasetHeader::decode(DatasetFormat::Ucsf, &bytes);
    }
}
