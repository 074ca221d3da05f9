//! Backend behavior through the public API.

use std::fs;

use spectrastore::header::{NV_HEADER_SIZE, UCSF_HEADER_SIZE};
use spectrastore::{
    DatasetFormat, DatasetHeader, DatasetLayout, DatasetStorage, DimCounter, FileStorage,
    MemoryStorage, StorageBackend, StorageError,
};

use crate::common::{fill_with_pattern, pattern_file, pattern_value, reopen};

#[test]
fn memory_and_file_backends_agree() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::blocked(&[7, 5, 3], &[4, 2, 3]);

    let mut memory: StorageBackend = MemoryStorage::new(layout.clone()).into();
    let mut file: StorageBackend = FileStorage::create(&dir.path().join("agree.nv"), layout.clone())
        .unwrap()
        .into();
    fill_with_pattern(&mut memory).unwrap();
    fill_with_pattern(&mut file).unwrap();

    for indices in DimCounter::new(layout.sizes()) {
        assert_eq!(
            memory.get_float(&indices).unwrap(),
            file.get_float(&indices).unwrap()
        );
    }
}

#[test]
fn header_sizes_by_format() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::full_matrix(&[2, 2]);
    let data = layout.byte_count();

    let nv = pattern_file(dir.path(), "a.nv", layout.clone());
    let ucsf = pattern_file(dir.path(), "a.ucsf", layout.clone());
    let raw = pattern_file(dir.path(), "data.dat", layout);

    assert_eq!(fs::metadata(nv).unwrap().len(), NV_HEADER_SIZE + data);
    assert_eq!(fs::metadata(ucsf).unwrap().len(), UCSF_HEADER_SIZE + data);
    assert_eq!(fs::metadata(raw).unwrap().len(), data);
}

#[test]
fn reopened_file_reads_back_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = pattern_file(dir.path(), "reopen.ucsf", DatasetLayout::blocked(&[9, 6], &[4, 4]));
    let mut storage = reopen(&path, &[9, 6]);
    assert_eq!(storage.layout().block_sizes(), &[4, 4]);
    for indices in DimCounter::new(&[9, 6]) {
        assert_eq!(storage.get_float(&indices).unwrap(), pattern_value(&indices));
    }
}

#[test]
fn partial_header_write_keeps_file_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = pattern_file(dir.path(), "hdr.nv", DatasetLayout::full_matrix(&[3, 3]));
    let mut storage = FileStorage::open(&path).unwrap();
    storage.write_header(false).unwrap();
    storage.close().unwrap();

    let bytes = fs::read(&path).unwrap();
    let header = DatasetHeader::decode(DatasetFormat::Nv, &bytes[..NV_HEADER_SIZE as usize]).unwrap();
    assert_eq!(header.layout.sizes(), &[3, 3]);
}

#[test]
fn corrupt_nv_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = pattern_file(dir.path(), "bad.nv", DatasetLayout::full_matrix(&[3, 3]));
    let mut bytes = fs::read(&path).unwrap();
    bytes[9] ^= 0xFF;
    fs::write(&path, bytes).unwrap();

    let err = FileStorage::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::InvalidHeader { .. }), "{}", err);
}

#[test]
fn too_many_dimensions_for_ucsf() {
    let dir = tempfile::tempdir().unwrap();
    let result = FileStorage::create(&dir.path().join("wide.ucsf"), DatasetLayout::full_matrix(&[2; 5]));
    assert!(matches!(
        result,
        Err(StorageError::UnsupportedFormat {
            format: DatasetFormat::Ucsf,
            ..
        })
    ));
    // NV can hold it.
    assert!(FileStorage::create(&dir.path().join("wide.nv"), DatasetLayout::full_matrix(&[2; 5])).is_ok());
}

#[test]
fn closing_twice_is_harmless() {
    let mut memory: StorageBackend = MemoryStorage::new(DatasetLayout::full_matrix(&[4])).into();
    memory.close().unwrap();
    memory.close().unwrap();
    assert!(memory.is_closed());
}
