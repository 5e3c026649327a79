use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use std::path::PathBuf;

/// Command-line arguments of the `dupes` binary.
///
/// Every option can also come from the environment (or a `.env` file); the
/// command line wins when both are present.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dupes",
    version,
    about = "Finds files sharing the same name and size in a directory tree"
)]
pub struct FinderArgs {
    /// Directory to scan. The tool fails if it cannot be read.
    ///
    /// Environment variable: `SEARCH_PATH`
    #[arg(short = 'p', long = "path", env = "SEARCH_PATH", default_value = ".")]
    pub search_path: PathBuf,

    /// Delete every copy except the first one of each group.
    #[arg(long = "remove", default_value_t = false)]
    pub remove_duplicates: bool,

    /// With `--remove`, delete without asking for confirmation.
    #[arg(short = 'y', long = "yes", default_value_t = false)]
    pub skip_confirmation: bool,

    /// Number of pool workers scanning subdirectories in parallel.
    ///
    /// Environment variable: `WORKERS`
    #[arg(short = 'w', long, env = "WORKERS", default_value_t = 1)]
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct FinderConfig {
    pub search_path: PathBuf,
    pub remove_duplicates: bool,
    pub skip_confirmation: bool,
    pub workers: usize,
}

impl TryFrom<FinderArgs> for FinderConfig {
    type Error = anyhow::Error;

    fn try_from(args: FinderArgs) -> Result<Self, Self::Error> {
        if args.workers == 0 {
            bail!("WORKERS must be greater than 0");
        }

        Ok(Self {
            search_path: args.search_path,
            remove_duplicates: args.remove_duplicates,
            skip_confirmation: args.skip_confirmation,
            workers: args.workers,
        })
    }
}

/// Command-line arguments of the `until-term` binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "until-term",
    version,
    about = "Repeats a long job on a worker pool until Ctrl+C or SIGTERM"
)]
pub struct UntilTermArgs {
    /// Number of pool workers.
    ///
    /// Environment variable: `WORKERS`
    #[arg(long, env = "WORKERS", default_value_t = 1)]
    pub workers: usize,

    /// Duration of one unit of simulated work, in milliseconds.
    ///
    /// Environment variable: `WORK_MS`
    #[arg(long, env = "WORK_MS", default_value_t = 10_000)]
    pub work_ms: u64,

    /// How long to wait for work in flight once a signal arrives, in
    /// milliseconds.
    ///
    /// Environment variable: `STOP_TIMEOUT_MS`
    #[arg(long, env = "STOP_TIMEOUT_MS", default_value_t = 1_000)]
    pub stop_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct UntilTermConfig {
    pub workers: usize,
    pub work_duration: Duration,
    pub stop_timeout: Duration,
}

impl TryFrom<UntilTermArgs> for UntilTermConfig {
    type Error = anyhow::Error;

    fn try_from(args: UntilTermArgs) -> Result<Self, Self::Error> {
        if args.workers == 0 {
            bail!("WORKERS must be greater than 0");
        }

        Ok(Self {
            workers: args.workers,
            work_duration: Duration::from_millis(args.work_ms),
            stop_timeout: Duration::from_millis(args.stop_timeout_ms),
        })
    }
}
