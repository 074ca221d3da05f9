//! End-to-end resize tests against real files.

use std::fs;

use spectrastore::resize::temp_path;
use spectrastore::{
    resize_all, resize_dim, resize_dim_with, Dataset, DatasetFormat, DatasetLayout, DatasetStorage,
    FileStorage, MemoryStorage, ResizeJob, StorageBackend, StorageConfig,
};

use crate::common::{assert_pattern_preserved, fill_with_pattern, pattern_file, reopen};

fn open_backend(path: &std::path::Path) -> (DatasetLayout, StorageBackend) {
    let storage = FileStorage::open(path).unwrap();
    (storage.layout().clone(), StorageBackend::File(storage))
}

#[test]
fn growing_a_file_replaces_it_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = pattern_file(dir.path(), "grow.nv", DatasetLayout::full_matrix(&[4, 3]));
    let canonical = fs::canonicalize(&path).unwrap();

    let (layout, mut source) = open_backend(&path);
    let mut dataset = Dataset::with_file(&path);
    let mut resized = resize_dim(&mut dataset, &layout, &mut source, &[6, 5]).unwrap();

    assert!(source.is_closed());
    assert_eq!(resized.file_path(), Some(canonical.as_path()));
    assert!(!temp_path(&canonical).exists());
    assert_pattern_preserved(&mut resized, &[4, 3]);
    resized.close().unwrap();

    let mut reopened = reopen(&path, &[6, 5]);
    assert_pattern_preserved(&mut reopened, &[4, 3]);
}

#[test]
fn shrinking_a_blocked_ucsf_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = pattern_file(dir.path(), "tiles.ucsf", DatasetLayout::blocked(&[8, 8], &[4, 4]));

    let (layout, mut source) = open_backend(&path);
    let mut dataset = Dataset::with_file(&path);
    let mut resized = resize_dim(&mut dataset, &layout, &mut source, &[5, 3]).unwrap();
    assert_eq!(resized.layout().block_sizes(), &[4, 3]);
    assert_pattern_preserved(&mut resized, &[8, 8]);
    resized.close().unwrap();

    let reopened = reopen(&path, &[5, 3]);
    assert_eq!(reopened.format(), DatasetFormat::Ucsf);
    assert_eq!(
        fs::metadata(&path).unwrap().len(),
        reopened.header().size() + reopened.layout().byte_count()
    );
}

#[test]
fn full_matrix_stays_full_after_resize() {
    let dir = tempfile::tempdir().unwrap();
    let path = pattern_file(dir.path(), "full.nv", DatasetLayout::full_matrix(&[3, 3, 2]));

    let (layout, mut source) = open_backend(&path);
    let mut dataset = Dataset::with_file(&path);
    let mut resized = resize_dim(&mut dataset, &layout, &mut source, &[4, 2, 3]).unwrap();
    assert!(resized.layout().is_full_matrix());
    assert_pattern_preserved(&mut resized, &[3, 3, 2]);
}

#[test]
fn failed_resize_leaves_original_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = pattern_file(dir.path(), "keep.nv", DatasetLayout::full_matrix(&[4, 4]));
    let before = fs::read(&path).unwrap();

    // A directory squatting on the temp path makes the target impossible to create.
    let canonical = fs::canonicalize(&path).unwrap();
    fs::create_dir(temp_path(&canonical)).unwrap();

    let (layout, mut source) = open_backend(&path);
    let mut dataset = Dataset::with_file(&path);
    let result = resize_dim(&mut dataset, &layout, &mut source, &[8, 8]);
    assert!(result.is_err());

    assert!(!source.is_closed());
    assert_eq!(source.layout().sizes(), &[4, 4]);
    assert_pattern_preserved(&mut source, &[4, 4]);
    source.close().unwrap();
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn source_file_not_recorded_on_dataset_is_still_replaced_safely() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unrecorded.nv");
    {
        let mut storage = FileStorage::create(&path, DatasetLayout::full_matrix(&[4, 4])).unwrap();
        storage.set_float(7.0, &[1, 1]).unwrap();
        storage.close().unwrap();
    }
    let canonical = fs::canonicalize(&path).unwrap();

    let (layout, mut source) = open_backend(&path);
    // Only the name is known; the backing file lives on the source backend.
    let mut dataset = Dataset::new(&path);
    let mut resized = resize_dim(&mut dataset, &layout, &mut source, &[8, 8]).unwrap();

    assert!(source.is_closed());
    assert!(!temp_path(&canonical).exists());
    assert_eq!(dataset.file(), Some(canonical.as_path()));
    assert_eq!(resized.get_float(&[1, 1]).unwrap(), 7.0);
    resized.close().unwrap();

    let mut reopened = reopen(&path, &[8, 8]);
    assert_eq!(reopened.get_float(&[1, 1]).unwrap(), 7.0);
    assert_eq!(reopened.get_float(&[7, 7]).unwrap(), 0.0);
}

#[test]
fn memory_dataset_spills_to_its_canonical_path() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::full_matrix(&[16, 16]);
    let mut source: StorageBackend = MemoryStorage::new(layout.clone()).into();
    fill_with_pattern(&mut source).unwrap();

    let config = StorageConfig {
        memory_limit_bytes: 1024,
    };
    let mut dataset = Dataset::new(dir.path().join("spill.ucsf"));
    let mut resized = resize_dim_with(&config, &mut dataset, &layout, &mut source, &[32, 16]).unwrap();

    let canonical = fs::canonicalize(dir.path()).unwrap().join("spill.ucsf");
    assert_eq!(dataset.file(), Some(canonical.as_path()));
    assert!(!source.is_closed());
    assert_pattern_preserved(&mut resized, &[16, 16]);
    resized.close().unwrap();
    reopen(&canonical, &[32, 16]);
}

#[test]
fn raw_files_keep_their_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.dat");
    let layout = DatasetLayout::full_matrix(&[5, 2]);
    {
        let mut storage = FileStorage::create(&path, layout.clone()).unwrap();
        fill_with_pattern(&mut storage).unwrap();
        storage.close().unwrap();
    }

    let mut source = StorageBackend::File(FileStorage::open_raw(&path, layout.clone()).unwrap());
    let mut dataset = Dataset::with_file(&path);
    let mut resized = resize_dim(&mut dataset, &layout, &mut source, &[3, 4]).unwrap();
    resized.close().unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 3 * 4 * 4);
    let mut reopened = FileStorage::open_raw(&path, DatasetLayout::full_matrix(&[3, 4])).unwrap();
    assert_pattern_preserved(&mut reopened, &[5, 2]);
}

#[test]
fn independent_datasets_resize_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let mut jobs = Vec::new();
    for i in 0..6 {
        let name = format!("batch{}.nv", i);
        let sizes = [4 + i, 3];
        let path = pattern_file(dir.path(), &name, DatasetLayout::full_matrix(&sizes));
        let (layout, backend) = open_backend(&path);
        jobs.push(ResizeJob {
            dataset: Dataset::with_file(&path),
            layout,
            backend,
            new_sizes: vec![2 + 2 * i, 5],
        });
    }
    // One in-memory dataset among the file-backed ones.
    let layout = DatasetLayout::full_matrix(&[3, 3]);
    let mut memory: StorageBackend = MemoryStorage::new(layout.clone()).into();
    fill_with_pattern(&mut memory).unwrap();
    jobs.push(ResizeJob {
        dataset: Dataset::new(dir.path().join("memory.nv")),
        layout,
        backend: memory,
        new_sizes: vec![4, 4],
    });

    let outcomes = resize_all(&StorageConfig::default(), jobs);
    assert_eq!(outcomes.len(), 7);
    for (i, outcome) in outcomes.into_iter().enumerate() {
        let mut resized = outcome.result.unwrap();
        if i < 6 {
            assert!(outcome.previous.is_closed());
            assert_pattern_preserved(&mut resized, &[4 + i, 3]);
        } else {
            assert!(resized.is_in_memory());
            assert!(outcome.dataset.file().is_none());
            assert_pattern_preserved(&mut resized, &[3, 3]);
        }
        resized.close().unwrap();
    }
}
