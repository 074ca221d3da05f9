//! Storage engine for multidimensional spectral datasets.
//!
//! A dataset is an N-dimensional array of `f32` held either in memory or in
//! a file with a format-specific header (NV, UCSF, or raw `data.dat`). The
//! crate addresses elements through a (possibly blocked) layout, resizes
//! datasets without losing data, and verifies files against references.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │  layout.rs  │────▶│  header.rs   │────▶│    storage/      │
//! │ (sizes,     │     │ (NV / UCSF / │     │ (MemoryStorage,  │
//! │  blocks)    │     │  raw codec)  │     │  FileStorage)    │
//! └─────────────┘     └──────────────┘     └──────────────────┘
//!        │                                          │
//!        ▼                                          ▼
//! ┌─────────────┐                          ┌──────────────────┐
//! │ counter.rs  │─────────────────────────▶│    resize.rs     │
//! │ (DimCounter)│                          │ (copy, swap file)│
//! └─────────────┘                          └──────────────────┘
//!        │
//!        ▼
//! ┌─────────────┐     ┌──────────────┐
//! │  group.rs   │     │   verify/    │  byte / region / float compare
//! │ (GroupIndex)│     │              │  of whole files and directories
//! └─────────────┘     └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use spectrastore::{resize_dim, Dataset, DatasetLayout, DatasetStorage, MemoryStorage};
//!
//! let layout = DatasetLayout::full_matrix(&[512, 128]);
//! let mut backend = MemoryStorage::new(layout.clone()).into();
//! let mut dataset = Dataset::new("hsqc.nv");
//! let mut backend = resize_dim(&mut dataset, &layout, &mut backend, &[1024, 128])?;
//! backend.set_float(1.0, &[700, 3])?;
//! ```

// Module declarations
pub mod config;
pub mod contracts;
mod counter;
mod dataset;
mod error;
pub mod group;
pub mod header;
mod layout;
pub mod resize;
pub mod storage;
pub mod testing;
pub mod verify;

// Re-exports for public API
pub use config::{Config, StorageConfig, VerifyConfig};
pub use counter::DimCounter;
pub use dataset::Dataset;
pub use error::{StorageError, StorageResult};
pub use group::{skip_string, GroupIndex};
pub use header::{compute_crc32, DatasetFormat, DatasetHeader};
pub use layout::{DatasetLayout, BYTES_PER_POINT};
pub use resize::{copy_to, resize_all, resize_dim, resize_dim_with, ResizeJob, ResizeOutcome};
pub use storage::{DatasetStorage, FileStorage, MemoryStorage, StorageBackend};
pub use verify::{
    compare, compare_detailed, compare_detailed_with, compare_directories, compare_float,
    DetailedMismatch, FileComparison, FileOutcome, FloatMismatch, Mismatch,
};
