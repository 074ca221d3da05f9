// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Tunable thresholds.
//!
//! Every number the engine makes a decision on lives here with a named
//! default, so tests and deployments can override it without touching the
//! code that uses it:
//!
//! - `StorageConfig::memory_limit_bytes`: a resize of an in-memory dataset
//!   stays in memory only while the target is smaller than this.
//! - `VerifyConfig::{nv,ucsf}_header_size`: where the verifier splits header
//!   from data when classifying a mismatch.
//!
//! A JSON file can carry either section; missing fields keep their defaults.
//!
//! ```json
//! { "storage": { "memory_limit_bytes": 1048576 },
//!   "verify":  { "nv_header_size": 2048 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::header::{DatasetFormat, NV_HEADER_SIZE, RAW_HEADER_SIZE, UCSF_HEADER_SIZE};

/// In-memory resize target limit: 137 MB.
pub const MEMORY_LIMIT_BYTES: u64 = 137_000_000;

/// Environment variable overriding [`StorageConfig::memory_limit_bytes`].
pub const MEMORY_LIMIT_ENV: &str = "SPECTRASTORE_MEMORY_LIMIT";

/// Settings for backend allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub memory_limit_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            memory_limit_bytes: MEMORY_LIMIT_BYTES,
        }
    }
}

impl StorageConfig {
    /// Defaults, with `SPECTRASTORE_MEMORY_LIMIT` applied when it parses.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `SPECTRASTORE_MEMORY_LIMIT` on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(MEMORY_LIMIT_ENV) {
            match value.trim().parse::<u64>() {
                Ok(limit) => self.memory_limit_bytes = limit,
                Err(_) => tracing::warn!(
                    variable = MEMORY_LIMIT_ENV,
                    value = %value,
                    "ignoring unparsable memory limit"
                ),
            }
        }
        self
    }

    /// Whether a dataset of `byte_count` bytes may be held in memory.
    pub fn fits_in_memory(&self, byte_count: u64) -> bool {
        byte_count < self.memory_limit_bytes
    }
}

/// Header sizes used to classify verifier mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub nv_header_size: u64,
    pub ucsf_header_size: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            nv_header_size: NV_HEADER_SIZE,
            ucsf_header_size: UCSF_HEADER_SIZE,
        }
    }
}

impl VerifyConfig {
    /// Header size for the format implied by `path`'s file name.
    pub fn header_size_for(&self, path: &Path) -> u64 {
        match DatasetFormat::from_path(path) {
            DatasetFormat::Nv => self.nv_header_size,
            DatasetFormat::Ucsf => self.ucsf_header_size,
            DatasetFormat::Raw => RAW_HEADER_SIZE,
        }
    }
}

/// Complete configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub verify: VerifyConfig,
}

impl Config {
    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> StorageResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|reason| StorageError::Config {
            path: PathBuf::from(path),
            reason,
        })
    }

    /// Parse configuration JSON.
    pub fn parse(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }
}
