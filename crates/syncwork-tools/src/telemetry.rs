//! Log output for the binaries.
//!
//! Events are printed through `tracing_subscriber::fmt` in a pretty,
//! human-readable layout with thread id, file and line, timestamped in local
//! time (RFC 3339). Filtering follows `RUST_LOG` and defaults to `info`.
//!
//! The `syncwork` library emits its own events under the same subscriber, so
//! `RUST_LOG=debug` also shows batch and shutdown activity of the pool and
//! `RUST_LOG=trace` shows every worker starting and stopping.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    Ok(())
}
