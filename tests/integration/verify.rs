//! Golden-file verification of generated datasets.

use std::fs;

use spectrastore::header::NV_HEADER_SIZE;
use spectrastore::{
    compare, compare_detailed, compare_directories, compare_float, DatasetLayout, FileOutcome,
    FloatMismatch, Mismatch,
};

use crate::common::{corrupt_byte, float_bytes, reference_pair};

#[test]
fn identical_datasets_match() {
    let dir = tempfile::tempdir().unwrap();
    let (reference, test) = reference_pair(dir.path(), "same.nv", DatasetLayout::full_matrix(&[8, 4]));
    assert_eq!(compare(&reference, &test).unwrap(), Mismatch::Equal);
    assert!(compare_detailed(&reference, &test).unwrap().is_equal());
    assert_eq!(compare_float(&reference, &test).unwrap(), FloatMismatch::Equal);
}

#[test]
fn data_corruption_is_located() {
    let dir = tempfile::tempdir().unwrap();
    let (reference, test) = reference_pair(dir.path(), "data.nv", DatasetLayout::full_matrix(&[8, 4]));
    let offset = NV_HEADER_SIZE as usize + 21;
    corrupt_byte(&test, offset).unwrap();

    assert_eq!(
        compare(&reference, &test).unwrap(),
        Mismatch::Content {
            offset: offset as u64
        }
    );
    let detail = compare_detailed(&reference, &test).unwrap();
    assert_eq!(detail.size_error, None);
    assert_eq!(detail.header_offset, None);
    assert_eq!(detail.data_offset, Some(offset as u64));
}

#[test]
fn header_corruption_is_located() {
    let dir = tempfile::tempdir().unwrap();
    let (reference, test) = reference_pair(dir.path(), "head.nv", DatasetLayout::full_matrix(&[8, 4]));
    corrupt_byte(&test, 1500).unwrap();

    let detail = compare_detailed(&reference, &test).unwrap();
    assert_eq!(detail.header_offset, Some(1500));
    assert_eq!(detail.data_offset, None);
}

#[test]
fn truncated_dataset_reports_size() {
    let dir = tempfile::tempdir().unwrap();
    let (reference, test) = reference_pair(dir.path(), "short.ucsf", DatasetLayout::full_matrix(&[8]));
    let bytes = fs::read(&test).unwrap();
    fs::write(&test, &bytes[..bytes.len() - 4]).unwrap();

    let expected = bytes.len() as u64 - 4;
    assert_eq!(
        compare(&reference, &test).unwrap(),
        Mismatch::Size {
            shorter_len: expected
        }
    );
    assert_eq!(compare_detailed(&reference, &test).unwrap().size_error, Some(expected));
}

#[test]
fn fifth_float_differs() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("ref.dat");
    let test = dir.path().join("test.dat");
    fs::write(&reference, float_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])).unwrap();
    fs::write(&test, float_bytes(&[1.0, 2.0, 3.0, 4.0, -5.0, 6.0])).unwrap();
    assert_eq!(compare_float(&reference, &test).unwrap(), FloatMismatch::Element { index: 4 });
}

#[test]
fn directory_of_datasets() {
    let dir = tempfile::tempdir().unwrap();
    reference_pair(dir.path(), "a.nv", DatasetLayout::full_matrix(&[4, 4]));
    let (_, b_test) = reference_pair(dir.path(), "b.nv", DatasetLayout::full_matrix(&[4, 4]));
    corrupt_byte(&b_test, NV_HEADER_SIZE as usize).unwrap();

    let results = compare_directories(&dir.path().join("ref"), &dir.path().join("test")).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].outcome, FileOutcome::Match);
    match &results[1].outcome {
        FileOutcome::Mismatch(detail) => {
            assert_eq!(detail.data_offset, Some(NV_HEADER_SIZE));
            assert_eq!(detail.header_offset, None);
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
}
