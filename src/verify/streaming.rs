// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Streaming file comparisons.
//!
//! Files are read in fixed-size chunks through buffered readers, so memory
//! use does not grow with file size.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::config::VerifyConfig;

use super::types::{DetailedMismatch, FloatMismatch, Mismatch};

/// Bytes compared per read. A multiple of 4 so float chunks stay aligned.
const CHUNK_SIZE: usize = 64 * 1024;

const FLOAT_SIZE: u64 = 4;

/// Byte-exact comparison.
///
/// Lengths are checked first: if they differ the result is
/// [`Mismatch::Size`] with the shorter length and no content is read.
pub fn compare(reference: &Path, test: &Path) -> io::Result<Mismatch> {
    let len = match checked_len(reference, test)? {
        Ok(len) => len,
        Err(shorter_len) => return Ok(Mismatch::Size { shorter_len }),
    };
    Ok(match first_difference_in(reference, test, 0, len)? {
        Some(offset) => Mismatch::Content { offset },
        None => Mismatch::Equal,
    })
}

/// [`compare_detailed_with`] using the default header sizes.
pub fn compare_detailed(reference: &Path, test: &Path) -> io::Result<DetailedMismatch> {
    compare_detailed_with(&VerifyConfig::default(), reference, test)
}

/// Byte comparison that reports the header and data regions separately.
///
/// The header size comes from the reference file's name. When the files
/// differ, each region is scanned on its own so a header-only corruption
/// leaves `data_offset` empty and vice versa.
pub fn compare_detailed_with(
    config: &VerifyConfig,
    reference: &Path,
    test: &Path,
) -> io::Result<DetailedMismatch> {
    let len = match checked_len(reference, test)? {
        Ok(len) => len,
        Err(shorter_len) => {
            return Ok(DetailedMismatch {
                size_error: Some(shorter_len),
                ..DetailedMismatch::default()
            })
        }
    };
    if first_difference_in(reference, test, 0, len)?.is_none() {
        return Ok(DetailedMismatch::default());
    }

    let header_end = config.header_size_for(reference).min(len);
    let header_offset = first_difference_in(reference, test, 0, header_end)?;
    let data_offset = first_difference_in(reference, test, header_end, len)?;
    Ok(DetailedMismatch {
        size_error: None,
        data_offset,
        header_offset,
    })
}

/// Compare both files as sequences of big-endian `f32`.
///
/// Two floats are equal when their bit patterns match, except that every
/// NaN equals every other NaN. `+0.0` and `-0.0` differ. Trailing bytes that
/// do not fill a whole float are compared as bytes and reported at the index
/// they would occupy.
pub fn compare_float(reference: &Path, test: &Path) -> io::Result<FloatMismatch> {
    let len = match checked_len(reference, test)? {
        Ok(len) => len,
        Err(shorter_len) => return Ok(FloatMismatch::Size { shorter_len }),
    };

    let mut ref_reader = BufReader::new(File::open(reference)?);
    let mut test_reader = BufReader::new(File::open(test)?);
    let mut ref_buf = vec![0u8; CHUNK_SIZE];
    let mut test_buf = vec![0u8; CHUNK_SIZE];
    let mut index = 0u64;
    let mut remaining = len;

    while remaining > 0 {
        let n = remaining.min(CHUNK_SIZE as u64) as usize;
        ref_reader.read_exact(&mut ref_buf[..n])?;
        test_reader.read_exact(&mut test_buf[..n])?;

        let ref_words = ref_buf[..n].chunks(FLOAT_SIZE as usize);
        let test_words = test_buf[..n].chunks(FLOAT_SIZE as usize);
        for (a, b) in ref_words.zip(test_words) {
            let differs = match (to_float(a), to_float(b)) {
                (Some(x), Some(y)) => !floats_match(x, y),
                _ => a != b,
            };
            if differs {
                return Ok(FloatMismatch::Element { index });
            }
            index += 1;
        }
        remaining -= n as u64;
    }
    Ok(FloatMismatch::Equal)
}

/// Java `Float.compare(a, b) == 0`.
pub fn floats_match(a: f32, b: f32) -> bool {
    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
}

fn to_float(word: &[u8]) -> Option<f32> {
    let bytes: [u8; 4] = word.try_into().ok()?;
    Some(f32::from_be_bytes(bytes))
}

/// `Ok(len)` when both files have the same length, else `Err(shorter)`.
fn checked_len(reference: &Path, test: &Path) -> io::Result<Result<u64, u64>> {
    let ref_len = fs::metadata(reference)?.len();
    let test_len = fs::metadata(test)?.len();
    Ok(if ref_len == test_len {
        Ok(ref_len)
    } else {
        Err(ref_len.min(test_len))
    })
}

/// First differing absolute offset in `[start, end)`.
fn first_difference_in(reference: &Path, test: &Path, start: u64, end: u64) -> io::Result<Option<u64>> {
    if start >= end {
        return Ok(None);
    }
    let mut ref_reader = open_at(reference, start)?;
    let mut test_reader = open_at(test, start)?;
    let mut ref_buf = vec![0u8; CHUNK_SIZE];
    let mut test_buf = vec![0u8; CHUNK_SIZE];
    let mut pos = start;

    while pos < end {
        let n = (end - pos).min(CHUNK_SIZE as u64) as usize;
        ref_reader.read_exact(&mut ref_buf[..n])?;
        test_reader.read_exact(&mut test_buf[..n])?;
        if let Some(i) = ref_buf[..n].iter().zip(&test_buf[..n]).position(|(a, b)| a != b) {
            return Ok(Some(pos + i as u64));
        }
        pos += n as u64;
    }
    Ok(None)
}

fn open_at(path: &Path, offset: u64) -> io::Result<BufReader<File>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    Ok(BufReader::new(file))
}
