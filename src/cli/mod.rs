// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the spectrastore command-line interface.
//!
//! `inspect` and `create` work on single dataset files, `resize` changes a
//! file's extents in place, and `compare` / `compare-dir` check generated
//! files against golden references. Comparison commands exit with status 1
//! when anything differs, so they can gate a test script.

pub mod display;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "spectrastore",
    about = "Create, resize and verify multidimensional spectral datasets",
    version
)]
pub struct Cli {
    /// JSON configuration file (memory limit, verifier header sizes)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the header, layout and data checksum of a dataset file
    Inspect {
        /// Path to a .nv, .ucsf or data.dat file
        file: PathBuf,

        /// Extents of a headerless data.dat file
        #[arg(long, value_delimiter = ',')]
        sizes: Option<Vec<usize>>,
    },

    /// Create a zero-filled dataset file
    Create {
        /// Output path; the format follows the file name
        file: PathBuf,

        /// Extents, fastest dimension first (e.g. 512,128)
        #[arg(long, value_delimiter = ',', required = true)]
        sizes: Vec<usize>,

        /// Block (tile) sizes; omit for a full-matrix layout
        #[arg(long, value_delimiter = ',')]
        block: Option<Vec<usize>>,
    },

    /// Resize an existing dataset file in place, keeping its data
    Resize {
        /// Dataset file to resize
        file: PathBuf,

        /// New extents; must have as many dimensions as the file
        #[arg(long, value_delimiter = ',', required = true)]
        sizes: Vec<usize>,

        /// Current extents of a headerless data.dat file
        #[arg(long, value_delimiter = ',')]
        current: Option<Vec<usize>>,
    },

    /// Compare a dataset file with a reference
    Compare {
        /// Reference (golden) file
        reference: PathBuf,

        /// File under test
        test: PathBuf,

        /// Comparison granularity
        #[arg(long, value_enum, default_value_t = CompareMode::Detailed)]
        mode: CompareMode,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare every file of a reference directory with a test directory
    CompareDir {
        /// Directory of reference files
        reference: PathBuf,

        /// Directory of files under test
        test: PathBuf,

        /// Print the outcomes as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompareMode {
    /// First differing byte
    Bytes,
    /// First differing byte in header and in data
    Detailed,
    /// First differing big-endian float
    Float,
}
