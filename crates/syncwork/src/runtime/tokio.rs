//! Driving a [`WorkerPool`] from a [`tokio`](https://docs.rs/tokio) runtime
//! until an external cancellation arrives.

use crate::{Error, Result, WorkerPool};
use core::time::Duration;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

/// How [`work_until_cancelled`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The round in flight at cancellation finished within the stop timeout.
    WorkDone,
    /// The stop timeout expired first. The round is still running on the
    /// pool; it was abandoned, not aborted.
    TimedOut,
}

/// Repeatedly runs `work` on `pool` until `token` is cancelled.
///
/// Each round submits `work` as a single-job batch from a blocking task and
/// the next round starts as soon as the previous one returns. Once `token` is
/// cancelled no new round starts and the round in flight gets at most
/// `stop_timeout` to finish.
///
/// The pool is left open; closing it is the caller's decision, since a round
/// abandoned on [`Shutdown::TimedOut`] would make `close` wait for it.
///
/// # Errors
///
/// Returns [`Error::PoolClosed`] if the pool is closed underneath the loop.
///
/// # Panics
///
/// Resumes the panic of a round whose job panicked.
pub async fn work_until_cancelled<F>(
    pool: Arc<WorkerPool>,
    token: CancellationToken,
    stop_timeout: Duration,
    work: F,
) -> Result<Shutdown>
where
    F: Fn() + Send + Sync + 'static,
{
    let work = Arc::new(work);
    let mut _rounds = 0_u64;

    loop {
        let mut round = spawn_round(&pool, &work);

        tokio::select! {
            // A round finishing together with the cancellation must not
            // start another one.
            biased;

            () = token.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    "Cancellation received after {_rounds} rounds, waiting up to {stop_timeout:?} for work in flight"
                );

                return match tokio::time::timeout(stop_timeout, &mut round).await {
                    Ok(joined) => {
                        round_result(joined)?;
                        #[cfg(feature = "tracing")]
                        tracing::info!("Work done");
                        Ok(Shutdown::WorkDone)
                    }
                    Err(_) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Stop timeout expired with work in flight");
                        Ok(Shutdown::TimedOut)
                    }
                };
            }
            joined = &mut round => {
                round_result(joined)?;
                _rounds += 1;
            }
        }
    }
}

fn spawn_round<F>(pool: &Arc<WorkerPool>, work: &Arc<F>) -> JoinHandle<Result<()>>
where
    F: Fn() + Send + Sync + 'static,
{
    let pool = Arc::clone(pool);
    let work = Arc::clone(work);
    tokio::task::spawn_blocking(move || {
        pool.run_batch(vec![move || work()])?;
        Ok(())
    })
}

fn round_result(joined: core::result::Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        // Only happens while the runtime itself is shutting down.
        Err(_) => Err(Error::PoolClosed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cancel_after(token: &CancellationToken, delay: Duration) {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            token.cancel();
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn finishes_in_flight_work_within_timeout() -> Result<()> {
        let pool = Arc::new(WorkerPool::new(1)?);
        let token = CancellationToken::new();
        let rounds = Arc::new(AtomicUsize::new(0));

        cancel_after(&token, Duration::from_millis(50));
        let counter = Arc::clone(&rounds);
        let outcome = work_until_cancelled(
            Arc::clone(&pool),
            token,
            Duration::from_secs(5),
            move || {
                std::thread::sleep(Duration::from_millis(5));
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await?;

        assert_eq!(outcome, Shutdown::WorkDone);
        assert!(rounds.load(Ordering::SeqCst) > 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn no_round_starts_after_cancellation() -> Result<()> {
        let pool = Arc::new(WorkerPool::new(1)?);

        for _ in 0..50 {
            let token = CancellationToken::new();
            let rounds = Arc::new(AtomicUsize::new(0));

            // The round cancels the token itself, so its completion and the
            // cancellation are observed by the same poll.
            let counter = Arc::clone(&rounds);
            let canceller = token.clone();
            let outcome = work_until_cancelled(
                Arc::clone(&pool),
                token,
                Duration::from_secs(5),
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    canceller.cancel();
                },
            )
            .await?;

            assert_eq!(outcome, Shutdown::WorkDone);
            assert_eq!(rounds.load(Ordering::SeqCst), 1);
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn abandons_slow_work_after_timeout() -> Result<()> {
        let pool = Arc::new(WorkerPool::new(1)?);
        let token = CancellationToken::new();

        cancel_after(&token, Duration::from_millis(20));
        let outcome = work_until_cancelled(
            Arc::clone(&pool),
            token,
            Duration::from_millis(20),
            || std::thread::sleep(Duration::from_millis(400)),
        )
        .await?;

        assert_eq!(outcome, Shutdown::TimedOut);
        assert!(!pool.is_closed());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn closed_pool_stops_the_loop() -> Result<()> {
        let pool = Arc::new(WorkerPool::new(1)?);
        pool.close();

        let outcome =
            work_until_cancelled(pool, CancellationToken::new(), Duration::from_secs(1), || {})
                .await;

        assert!(matches!(outcome, Err(Error::PoolClosed)));
        Ok(())
    }
}
