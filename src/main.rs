// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use spectrastore::verify::{compare_directories_with, count_reference_files};
use spectrastore::{
    compare, compare_detailed_with, compare_float, resize_dim_with, Config, Dataset,
    DatasetFormat, DatasetLayout, DatasetStorage, FileOutcome, FileStorage, StorageBackend,
    StorageConfig,
};

mod cli;
use cli::display::{self, themed, BOLD, RED};
use cli::{Cli, Commands, CompareMode};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", themed(RED, &[BOLD], "error:"), e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` picks the level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("spectrastore={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.storage = config.storage.with_env_overrides();
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Run one command. `Ok(false)` means the command worked but found a mismatch.
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { file, sizes } => {
            inspect(&file, sizes.as_deref())?;
            Ok(true)
        }
        Commands::Create { file, sizes, block } => {
            create(&file, &sizes, block.as_deref())?;
            Ok(true)
        }
        Commands::Resize {
            file,
            sizes,
            current,
        } => {
            resize(&config.storage, &file, &sizes, current.as_deref())?;
            Ok(true)
        }
        Commands::Compare {
            reference,
            test,
            mode,
            json,
        } => compare_files(&config, &reference, &test, mode, json),
        Commands::CompareDir {
            reference,
            test,
            json,
        } => compare_dirs(&config, &reference, &test, json),
    }
}

// ============================================================================
// DATASET COMMANDS
// ============================================================================

fn check_extents(sizes: &[usize]) -> Result<()> {
    ensure!(!sizes.is_empty(), "at least one extent is required");
    ensure!(
        sizes.iter().all(|&s| s > 0),
        "extents must be positive, got {:?}",
        sizes
    );
    Ok(())
}

fn open_dataset(file: &Path, raw_sizes: Option<&[usize]>) -> Result<FileStorage> {
    let storage = if DatasetFormat::from_path(file) == DatasetFormat::Raw {
        let Some(sizes) = raw_sizes else {
            bail!("{} has no header; pass its extents", file.display());
        };
        check_extents(sizes)?;
        FileStorage::open_raw(file, DatasetLayout::full_matrix(sizes))?
    } else {
        FileStorage::open(file)?
    };
    Ok(storage)
}

fn inspect(file: &Path, raw_sizes: Option<&[usize]>) -> Result<()> {
    let mut storage = open_dataset(file, raw_sizes)
        .with_context(|| format!("cannot inspect {}", file.display()))?;
    let header = storage.header().clone();
    let layout = &header.layout;
    let file_len = std::fs::metadata(file)?.len();
    let crc = data_checksum(file, header.size(), layout.byte_count())?;
    storage.close()?;

    display::section_top("DATASET");
    display::field("path", &file.display().to_string());
    display::field("format", &header.format.to_string());
    display::field("header", &display::format_size(header.size()));
    display::field("file size", &display::format_size(file_len));
    display::section_top("LAYOUT");
    display::field("extents", &display::format_extents(layout.sizes()));
    if layout.is_full_matrix() {
        display::field("blocks", "full matrix");
    } else {
        display::field("block sizes", &display::format_extents(layout.block_sizes()));
        display::field("block count", &layout.block_count().to_string());
    }
    display::field("points", &layout.point_count().to_string());
    display::field("stored", &display::format_size(layout.byte_count()));
    display::section_top("DATA");
    display::field("crc32", &format!("{:08x}", crc));
    display::section_bot();
    Ok(())
}

/// CRC32 of the data region, streamed.
fn data_checksum(file: &Path, offset: u64, len: u64) -> Result<u32> {
    let mut handle = File::open(file)?;
    handle.seek(SeekFrom::Start(offset))?;
    let mut reader = BufReader::new(handle).take(len);
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

fn create(file: &Path, sizes: &[usize], block: Option<&[usize]>) -> Result<()> {
    check_extents(sizes)?;
    let layout = match block {
        Some(block) => {
            ensure!(
                block.len() == sizes.len()
                    && block.iter().zip(sizes).all(|(&b, &s)| b > 0 && b <= s),
                "block sizes {:?} do not fit extents {:?}",
                block,
                sizes
            );
            DatasetLayout::blocked(sizes, block)
        }
        None => DatasetLayout::full_matrix(sizes),
    };
    let mut storage = FileStorage::create(file, layout)
        .with_context(|| format!("cannot create {}", file.display()))?;
    storage.close()?;
    println!(
        "{} created {} ({})",
        display::verdict_badge(true),
        file.display(),
        display::format_extents(sizes)
    );
    Ok(())
}

fn resize(
    config: &StorageConfig,
    file: &Path,
    sizes: &[usize],
    current: Option<&[usize]>,
) -> Result<()> {
    check_extents(sizes)?;
    let storage = open_dataset(file, current)?;
    let layout = storage.layout().clone();
    ensure!(
        layout.n_dim() == sizes.len(),
        "{} has {} dimensions, got {} new extents",
        file.display(),
        layout.n_dim(),
        sizes.len()
    );

    let mut dataset = Dataset::with_file(file);
    let mut source = StorageBackend::File(storage);
    let mut resized = resize_dim_with(config, &mut dataset, &layout, &mut source, sizes)
        .with_context(|| format!("cannot resize {}", file.display()))?;
    source.close()?;
    resized.close()?;

    println!(
        "{} resized {}: {} → {}",
        display::verdict_badge(true),
        file.display(),
        display::format_extents(layout.sizes()),
        display::format_extents(sizes)
    );
    Ok(())
}

// ============================================================================
// VERIFICATION COMMANDS
// ============================================================================

fn compare_files(
    config: &Config,
    reference: &Path,
    test: &Path,
    mode: CompareMode,
    json: bool,
) -> Result<bool> {
    let context = || format!("cannot compare {} with {}", reference.display(), test.display());
    let (equal, text, line) = match mode {
        CompareMode::Bytes => {
            let outcome = compare(reference, test).with_context(context)?;
            (
                outcome.is_equal(),
                serde_json::to_string_pretty(&outcome)?,
                display::mismatch_line(&outcome),
            )
        }
        CompareMode::Detailed => {
            let outcome = compare_detailed_with(&config.verify, reference, test).with_context(context)?;
            (
                outcome.is_equal(),
                serde_json::to_string_pretty(&outcome)?,
                display::detailed_line(&outcome),
            )
        }
        CompareMode::Float => {
            let outcome = compare_float(reference, test).with_context(context)?;
            (
                outcome.is_equal(),
                serde_json::to_string_pretty(&outcome)?,
                display::float_line(&outcome),
            )
        }
    };
    println!("{}", if json { text } else { line });
    Ok(equal)
}

fn compare_dirs(config: &Config, reference: &Path, test: &Path, json: bool) -> Result<bool> {
    let total = count_reference_files(reference)
        .with_context(|| format!("cannot list {}", reference.display()))?;

    #[cfg(feature = "parallel")]
    let progress = {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
            )?
            .progress_chars("━━╸"),
        );
        pb.set_prefix("Comparing");
        pb
    };

    let results = compare_directories_with(&config.verify, reference, test, |_comparison| {
        #[cfg(feature = "parallel")]
        progress.inc(1);
    })
    .with_context(|| format!("cannot compare {} with {}", reference.display(), test.display()))?;

    #[cfg(feature = "parallel")]
    progress.finish_and_clear();

    let matched = results.iter().filter(|c| c.outcome.is_match()).count();
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for comparison in &results {
            println!("{}", display::file_outcome_line(&comparison.name, &comparison.outcome));
        }
        let missing = results
            .iter()
            .filter(|c| c.outcome == FileOutcome::MissingInTest)
            .count();
        println!(
            "{} of {} files match ({} missing)",
            matched, total, missing
        );
    }
    Ok(matched == results.len())
}
