//! Resize property tests.
//!
//! For any source extents and any target extents of the same rank, every
//! element inside both keeps its value and every other target element is
//! zero, whether the target ends up in memory or in a file.

use proptest::prelude::*;
use spectrastore::{
    copy_to, resize_dim_with, Dataset, DatasetLayout, MemoryStorage, StorageBackend, StorageConfig,
};

use crate::common::{assert_pattern_preserved, fill_with_pattern};

/// Two same-rank extent vectors.
fn resize_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    (1usize..=3).prop_flat_map(|rank| {
        (
            prop::collection::vec(1usize..6, rank),
            prop::collection::vec(1usize..6, rank),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_memory_resize_preserves_overlap((old, new) in resize_strategy()) {
        let layout = DatasetLayout::full_matrix(&old);
        let mut source: StorageBackend = MemoryStorage::new(layout.clone()).into();
        fill_with_pattern(&mut source).unwrap();

        let mut dataset = Dataset::new("unused.nv");
        let mut resized = resize_dim_with(
            &StorageConfig::default(),
            &mut dataset,
            &layout,
            &mut source,
            &new,
        )
        .unwrap();
        prop_assert!(resized.is_in_memory());
        assert_pattern_preserved(&mut resized, &old);
    }

    #[test]
    fn prop_file_resize_preserves_overlap((old, new) in resize_strategy(), blocked in any::<bool>()) {
        let dir = tempfile::tempdir().unwrap();
        let layout = if blocked {
            let blocks: Vec<usize> = old.iter().map(|&s| s.div_ceil(2)).collect();
            DatasetLayout::blocked(&old, &blocks)
        } else {
            DatasetLayout::full_matrix(&old)
        };
        let mut source: StorageBackend = MemoryStorage::new(layout.clone()).into();
        fill_with_pattern(&mut source).unwrap();

        // A zero limit forces the file path.
        let config = StorageConfig { memory_limit_bytes: 0 };
        let mut dataset = Dataset::new(dir.path().join("prop.nv"));
        let mut resized = resize_dim_with(&config, &mut dataset, &layout, &mut source, &new).unwrap();
        prop_assert!(!resized.is_in_memory());
        assert_pattern_preserved(&mut resized, &old);
    }

    #[test]
    fn prop_copy_between_layouts((old, new) in resize_strategy()) {
        let source_layout = DatasetLayout::full_matrix(&old);
        let mut source = MemoryStorage::new(source_layout.clone());
        fill_with_pattern(&mut source).unwrap();
        let blocks: Vec<usize> = new.iter().map(|&s| s.min(2)).collect();
        let mut target = MemoryStorage::new(DatasetLayout::blocked(&new, &blocks));
        copy_to(&source_layout, &mut source, &mut target).unwrap();
        assert_pattern_preserved(&mut target, &old);
    }
}
