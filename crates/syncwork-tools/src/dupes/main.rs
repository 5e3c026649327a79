//! # `dupes`
//!
//! Finds files sharing the same name and size below a directory, scanning
//! top-level subdirectories in parallel on a `syncwork` worker pool, and
//! optionally removes every copy but the first.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin dupes -- -p ./photos -w 4 --remove
//! ```

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use syncwork::WorkerPool;
use syncwork_tools::{
    config::{FinderArgs, FinderConfig},
    files::{DuplicatesDescr, check_duplicates, delete_duplicates, scan_dir},
    telemetry::init_telemetry,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = FinderArgs::parse();
    let config = FinderConfig::try_from(args)?;

    init_telemetry()?;
    tracing::info!(
        "Searching {} with {} workers",
        config.search_path.display(),
        config.workers
    );

    let pool = WorkerPool::new(config.workers)?;
    let result = run(&pool, &config);
    pool.close();
    result
}

fn run(pool: &WorkerPool, config: &FinderConfig) -> anyhow::Result<()> {
    let files = scan_dir(&config.search_path, pool)
        .with_context(|| format!("failed to scan {}", config.search_path.display()))?;
    let duplicates = check_duplicates(&files);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_report(&mut out, files.len(), &duplicates)?;

    if duplicates.is_empty() || !config.remove_duplicates {
        return Ok(());
    }

    if !config.skip_confirmation && !confirm(&mut out, &mut io::stdin().lock())? {
        writeln!(out, "Nothing removed.")?;
        return Ok(());
    }

    delete_duplicates(&duplicates).context("failed to remove duplicates")?;
    let removed: usize = duplicates.iter().map(|d| d.duplicates.len()).sum();
    writeln!(out, "Removed {removed} files.")?;
    Ok(())
}

fn print_report(
    out: &mut impl Write,
    scanned: usize,
    duplicates: &[DuplicatesDescr],
) -> io::Result<()> {
    writeln!(out, "Scanned {scanned} files, {} duplicated.", duplicates.len())?;
    for group in duplicates {
        writeln!(out, "{} ({} bytes)", group.origin.display(), group.size)?;
        for copy in &group.duplicates {
            writeln!(out, "    {}", copy.display())?;
        }
    }
    Ok(())
}

fn confirm(out: &mut impl Write, input: &mut impl BufRead) -> io::Result<bool> {
    write!(out, "Remove the copies listed above? [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
