//! # `until-term`
//!
//! Runs a simulated long job on a `syncwork` worker pool over and over until
//! the process receives Ctrl+C or SIGTERM. After the signal, the job in
//! flight gets a bounded grace period before the process exits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin until-term -- --work-ms 3000 --stop-timeout-ms 1000
//! ```

use clap::Parser;
use std::sync::Arc;
use syncwork::{Shutdown, WorkerPool, work_until_cancelled};
use syncwork_tools::{
    config::{UntilTermArgs, UntilTermConfig},
    telemetry::init_telemetry,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = UntilTermArgs::parse();
    let config = UntilTermConfig::try_from(args)?;

    init_telemetry()?;
    tracing::info!("Started pid={}", std::process::id());
    log_startup_info(&config);

    let pool = Arc::new(WorkerPool::new(config.workers)?);
    let token = CancellationToken::new();
    tokio::spawn(shutdown_signal(token.clone()));

    let work_duration = config.work_duration;
    let outcome = work_until_cancelled(Arc::clone(&pool), token, config.stop_timeout, move || {
        tracing::info!("Working for {work_duration:?}");
        std::thread::sleep(work_duration);
    })
    .await?;

    match outcome {
        Shutdown::WorkDone => {
            tokio::task::spawn_blocking(move || pool.close()).await?;
            tracing::info!("Finished");
            Ok(())
        }
        Shutdown::TimedOut => {
            // Closing would wait for the abandoned job, and so would the
            // runtime's blocking pool on drop.
            tracing::warn!("Stop timeout expired, exiting with work in flight");
            std::process::exit(0);
        }
    }
}

fn log_startup_info(config: &UntilTermConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting work loop with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting work loop with {} workers, {:?} per unit of work",
            config.workers,
            config.work_duration
        );
    }
}

async fn shutdown_signal(token: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, stopping after the current unit of work...");
    token.cancel();
}
