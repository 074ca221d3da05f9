// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Dataset container formats and their fixed-size headers.
//!
//! Every dataset file is a fixed-size header followed by big-endian `f32`
//! data in layout order. The header size is a property of the format, so a
//! reader can seek to any element without parsing anything variable-length.
//!
//! ```text
//! NV (2048 bytes)
//! ┌──────┬─────┬──────┬─────┬────────────────────────────┬───────┬─────────┐
//! │ NVFX │ ver │ ndim │ rsv │ (size u32, block u32) × n  │ CRC32 │ padding │
//! └──────┴─────┴──────┴─────┴────────────────────────────┴───────┴─────────┘
//!   0      4     5      6     8                            8+8n    → 2048
//!
//! UCSF (692 bytes = 180 main + 4 × 128 axis slots)
//! ┌──────────────┬──────┬───────┬─────┬─────┬─────────┬──────────┬──────────┐
//! │ "UCSF NMR\0" │ ndim │ ncomp │ rsv │ ver │ padding │ axis 0   │ axis 1.. │
//! └──────────────┴──────┴───────┴─────┴─────┴─────────┴──────────┴──────────┘
//!   0              10     11      12    13    → 180     label(6) @+0,
//!                                                       points @+8, tile @+16
//!
//! RAW (0 bytes): bare data, geometry supplied by the caller.
//! ```
//!
//! The format is picked from the file name: `data.dat` is raw, `*.nv` is NV,
//! anything else is UCSF.

use std::fmt;
use std::path::Path;

use crc32fast::Hasher as Crc32Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::layout::DatasetLayout;

// ============================================================================
// CONSTANTS
// ============================================================================

/// NV header size in bytes.
pub const NV_HEADER_SIZE: u64 = 2048;

/// UCSF header size in bytes: 180-byte main header plus four 128-byte axis slots.
pub const UCSF_HEADER_SIZE: u64 = UCSF_MAIN_SIZE as u64 + UCSF_MAX_DIMS as u64 * UCSF_AXIS_SIZE as u64;

/// Raw data files carry no header.
pub const RAW_HEADER_SIZE: u64 = 0;

/// File name that marks a headerless raw data file.
pub const RAW_FILE_NAME: &str = "data.dat";

/// Magic bytes: "NVFX" in ASCII
pub const NV_MAGIC: [u8; 4] = [0x4E, 0x56, 0x46, 0x58];

/// Current NV header version
pub const NV_VERSION: u8 = 1;

/// Maximum dimensions an NV header can describe.
pub const NV_MAX_DIMS: usize = 32;

/// UCSF signature, NUL terminated
pub const UCSF_SIGNATURE: &[u8; 9] = b"UCSF NMR\0";

/// UCSF format version written at byte 13
pub const UCSF_VERSION: u8 = 2;

/// Maximum dimensions a UCSF header can describe.
pub const UCSF_MAX_DIMS: usize = 4;

const UCSF_MAIN_SIZE: usize = 180;
const UCSF_AXIS_SIZE: usize = 128;
const UCSF_LABEL_LEN: usize = 6;

// NV fixed prefix: magic (4) + version (1) + ndim (1) + reserved (2)
const NV_PREFIX: usize = 8;

// ============================================================================
// FORMAT
// ============================================================================

/// On-disk container format of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Nv,
    Ucsf,
    Raw,
}

impl DatasetFormat {
    /// Format implied by a file name.
    pub fn from_path(path: &Path) -> Self {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name == RAW_FILE_NAME {
            DatasetFormat::Raw
        } else if name.ends_with(".nv") {
            DatasetFormat::Nv
        } else {
            DatasetFormat::Ucsf
        }
    }

    /// Fixed header size of this format.
    pub fn header_size(self) -> u64 {
        match self {
            DatasetFormat::Nv => NV_HEADER_SIZE,
            DatasetFormat::Ucsf => UCSF_HEADER_SIZE,
            DatasetFormat::Raw => RAW_HEADER_SIZE,
        }
    }

    /// Largest number of dimensions the header can describe.
    pub fn max_dims(self) -> usize {
        match self {
            DatasetFormat::Nv => NV_MAX_DIMS,
            DatasetFormat::Ucsf => UCSF_MAX_DIMS,
            DatasetFormat::Raw => usize::MAX,
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetFormat::Nv => "NV",
            DatasetFormat::Ucsf => "UCSF",
            DatasetFormat::Raw => "raw",
        };
        f.write_str(name)
    }
}

// ============================================================================
// HEADER
// ============================================================================

/// In-process copy of a dataset file's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetHeader {
    pub format: DatasetFormat,
    pub layout: DatasetLayout,
}

impl DatasetHeader {
    /// Header for `layout` in `format`.
    ///
    /// Fails if the format cannot describe that many dimensions or an extent
    /// does not fit the header's `u32` fields.
    pub fn new(format: DatasetFormat, layout: DatasetLayout) -> StorageResult<Self> {
        if layout.n_dim() > format.max_dims() {
            return Err(StorageError::UnsupportedFormat {
                format,
                reason: format!(
                    "{} dimensions (at most {})",
                    layout.n_dim(),
                    format.max_dims()
                ),
            });
        }
        if format != DatasetFormat::Raw
            && layout.sizes().iter().any(|&s| u32::try_from(s).is_err())
        {
            return Err(StorageError::UnsupportedFormat {
                format,
                reason: "extent does not fit in 32 bits".to_string(),
            });
        }
        Ok(Self { format, layout })
    }

    /// Size of the full header region.
    pub fn size(&self) -> u64 {
        self.format.header_size()
    }

    /// Bytes that carry geometry; everything after is padding.
    pub fn significant_len(&self) -> usize {
        match self.format {
            DatasetFormat::Nv => NV_PREFIX + 8 * self.layout.n_dim() + 4,
            DatasetFormat::Ucsf => UCSF_MAIN_SIZE + UCSF_AXIS_SIZE * self.layout.n_dim(),
            DatasetFormat::Raw => 0,
        }
    }

    /// Encode the full header region (exactly `self.size()` bytes).
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.size() as usize];
        match self.format {
            DatasetFormat::Nv => self.encode_nv(&mut buf),
            DatasetFormat::Ucsf => self.encode_ucsf(&mut buf),
            DatasetFormat::Raw => {}
        }
        buf
    }

    fn encode_nv(&self, buf: &mut [u8]) {
        let layout = &self.layout;
        buf[0..4].copy_from_slice(&NV_MAGIC);
        buf[4] = NV_VERSION;
        buf[5] = layout.n_dim() as u8;
        // buf[6..8] is reserved
        let mut pos = NV_PREFIX;
        for dim in 0..layout.n_dim() {
            buf[pos..pos + 4].copy_from_slice(&(layout.size(dim) as u32).to_be_bytes());
            buf[pos + 4..pos + 8].copy_from_slice(&(layout.block_size(dim) as u32).to_be_bytes());
            pos += 8;
        }
        let crc = compute_crc32(&buf[..pos]);
        buf[pos..pos + 4].copy_from_slice(&crc.to_be_bytes());
    }

    fn encode_ucsf(&self, buf: &mut [u8]) {
        let layout = &self.layout;
        buf[..UCSF_SIGNATURE.len()].copy_from_slice(UCSF_SIGNATURE);
        buf[10] = layout.n_dim() as u8;
        buf[11] = 1; // one component: real data
        buf[13] = UCSF_VERSION;
        for dim in 0..layout.n_dim() {
            let axis = UCSF_MAIN_SIZE + dim * UCSF_AXIS_SIZE;
            let label = format!("D{}", dim + 1);
            let label = label.as_bytes();
            let n = label.len().min(UCSF_LABEL_LEN);
            buf[axis..axis + n].copy_from_slice(&label[..n]);
            buf[axis + 8..axis + 12].copy_from_slice(&(layout.size(dim) as u32).to_be_bytes());
            buf[axis + 16..axis + 20]
                .copy_from_slice(&(layout.block_size(dim) as u32).to_be_bytes());
        }
    }

    /// Decode a header of the given format from the start of `bytes`.
    pub fn decode(format: DatasetFormat, bytes: &[u8]) -> StorageResult<Self> {
        match format {
            DatasetFormat::Nv => Self::decode_nv(bytes),
            DatasetFormat::Ucsf => Self::decode_ucsf(bytes),
            DatasetFormat::Raw => Err(StorageError::UnsupportedFormat {
                format,
                reason: "raw files carry no header; supply the layout".to_string(),
            }),
        }
    }

    fn decode_nv(bytes: &[u8]) -> StorageResult<Self> {
        if bytes.len() < NV_PREFIX {
            return Err(StorageError::invalid_header("NV header truncated"));
        }
        if bytes[0..4] != NV_MAGIC {
            return Err(StorageError::invalid_header(format!(
                "invalid magic: expected NVFX, got {:?}",
                &bytes[0..4]
            )));
        }
        if bytes[4] != NV_VERSION {
            return Err(StorageError::invalid_header(format!(
                "unsupported NV version {}",
                bytes[4]
            )));
        }
        let n_dim = bytes[5] as usize;
        if n_dim == 0 || n_dim > NV_MAX_DIMS {
            return Err(StorageError::invalid_header(format!(
                "NV header claims {} dimensions",
                n_dim
            )));
        }
        let crc_pos = NV_PREFIX + 8 * n_dim;
        if bytes.len() < crc_pos + 4 {
            return Err(StorageError::invalid_header("NV header truncated"));
        }
        let stored_crc = read_u32(bytes, crc_pos);
        let actual_crc = compute_crc32(&bytes[..crc_pos]);
        if stored_crc != actual_crc {
            return Err(StorageError::invalid_header(format!(
                "CRC mismatch: header says {:08x}, computed {:08x}",
                stored_crc, actual_crc
            )));
        }

        let mut sizes = Vec::with_capacity(n_dim);
        let mut blocks = Vec::with_capacity(n_dim);
        for dim in 0..n_dim {
            let pos = NV_PREFIX + dim * 8;
            sizes.push(read_u32(bytes, pos) as usize);
            blocks.push(read_u32(bytes, pos + 4) as usize);
        }
        let layout =
            DatasetLayout::try_blocked(&sizes, &blocks).map_err(StorageError::invalid_header)?;
        Ok(Self {
            format: DatasetFormat::Nv,
            layout,
        })
    }

    fn decode_ucsf(bytes: &[u8]) -> StorageResult<Self> {
        if bytes.len() < UCSF_MAIN_SIZE {
            return Err(StorageError::invalid_header("UCSF header truncated"));
        }
        if &bytes[..8] != b"UCSF NMR" {
            return Err(StorageError::invalid_header("missing UCSF NMR signature"));
        }
        let n_dim = bytes[10] as usize;
        if n_dim == 0 || n_dim > UCSF_MAX_DIMS {
            return Err(StorageError::invalid_header(format!(
                "UCSF header claims {} dimensions",
                n_dim
            )));
        }
        if bytes[11] != 1 {
            return Err(StorageError::invalid_header(format!(
                "{} data components (only real data is supported)",
                bytes[11]
            )));
        }
        if bytes[13] != UCSF_VERSION {
            return Err(StorageError::invalid_header(format!(
                "unsupported UCSF version {}",
                bytes[13]
            )));
        }
        if bytes.len() < UCSF_MAIN_SIZE + n_dim * UCSF_AXIS_SIZE {
            return Err(StorageError::invalid_header("UCSF axis headers truncated"));
        }

        let mut sizes = Vec::with_capacity(n_dim);
        let mut tiles = Vec::with_capacity(n_dim);
        for dim in 0..n_dim {
            let axis = UCSF_MAIN_SIZE + dim * UCSF_AXIS_SIZE;
            sizes.push(read_u32(bytes, axis + 8) as usize);
            tiles.push(read_u32(bytes, axis + 16) as usize);
        }
        let layout =
            DatasetLayout::try_blocked(&sizes, &tiles).map_err(StorageError::invalid_header)?;
        Ok(Self {
            format: DatasetFormat::Ucsf,
            layout,
        })
    }
}

#[inline]
fn read_u32(bytes: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

/// Compute CRC32 over the given bytes
pub fn compute_crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
