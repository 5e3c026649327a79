//! Error types for `syncwork`.
//!
//! A single [`Error`] enum covers every failure the crate reports. Each
//! operation only ever produces a subset of it:
//!
//! - [`WorkerPool::new`]: `InvalidSize`
//! - [`WorkerPool::run_batch`] and [`WorkerPool::execute`]: `PoolClosed`
//! - [`average`]: `EmptyInput`
//! - [`catch_panic`]: `Panicked`
//!
//! Job-level failures are never surfaced here. A job records its own outcome
//! in its own fields.
//!
//! [`WorkerPool::new`]: crate::WorkerPool::new
//! [`WorkerPool::run_batch`]: crate::WorkerPool::run_batch
//! [`WorkerPool::execute`]: crate::WorkerPool::execute
//! [`average`]: crate::average
//! [`catch_panic`]: crate::catch_panic

use crate::recover::PanicError;

/// A result type defaulting to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `syncwork` can produce.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A pool was requested with zero workers.
    ///
    /// Not retryable: the caller must supply a positive worker count.
    #[error("Invalid pool size {size}: a pool needs at least one worker")]
    InvalidSize { size: usize },

    /// The pool has begun or finished shutting down.
    ///
    /// Not retryable against the same pool; create a new one.
    #[error("Pool closed")]
    PoolClosed,

    /// An aggregate was requested over an empty sequence.
    #[error("Invalid input: sequence is empty")]
    EmptyInput,

    /// A guarded closure panicked and the panic was recovered.
    #[error(transparent)]
    Panicked(#[from] PanicError),
}
