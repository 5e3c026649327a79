//! The [`WorkerPool`]: a fixed set of long-lived worker threads draining one
//! bounded FIFO queue.
//!
//! ## Lifecycle
//!
//! `Open -> (run_batch | execute)* -> Closing -> Closed`
//!
//! - [`WorkerPool::new`] spawns every worker up front; the pool never resizes.
//! - [`WorkerPool::run_batch`] enqueues a batch and blocks until all of it has
//!   run.
//! - [`WorkerPool::close`] stops new submissions, lets the workers drain what
//!   is already queued, and returns once every worker has exited. It is
//!   idempotent and is also run on drop.
//!
//! ## Locking
//!
//! The queue sender lives behind an [`RwLock`]. Submitters hold the shared
//! lock from the open check through their last enqueue, so a batch is either
//! entirely enqueued before the queue closes or rejected with
//! [`Error::PoolClosed`] before any of it is. `close` takes the exclusive lock
//! for the whole drain, which makes concurrent closers wait for the first one.
//! The completion wait in `run_batch` happens outside the lock; jobs already
//! queued keep draining while a close is in progress. The closed flag is
//! mirrored in an [`AtomicBool`] so [`WorkerPool::is_closed`] never waits for
//! a drain.

use crate::{
    error::{Error, Result},
    pool::{Job, task::Task, worker::spawn_worker},
};
use core::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};
use crossbeam_channel::Sender;
use parking_lot::RwLock;
use std::{
    any::Any,
    panic::resume_unwind,
    thread::{self, JoinHandle},
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A pool of `size` worker threads sharing a bounded task queue of capacity
/// `size`.
///
/// Workers are symmetric: no work stealing and no priorities. Each submitter's
/// tasks enter the queue in submission order and the queue is strict FIFO, but
/// tasks of one batch may run concurrently and finish in any order.
///
/// `WorkerPool` is `Send + Sync`; share it behind an `Arc` to submit from
/// several threads at once.
///
/// Never call [`WorkerPool::close`] or [`WorkerPool::run_batch`] from inside a
/// job running on the same pool: the former joins the calling worker, the
/// latter can starve the pool. [`WorkerPool::is_closed`] is safe anywhere.
pub struct WorkerPool {
    size: usize,
    /// Set by the first `close`, under the write lock, before the drain.
    closed: AtomicBool,
    state: RwLock<PoolState>,
}

struct PoolState {
    /// `None` once the pool is closed. Dropping the sender is what closes the
    /// queue, so taking it out of the `Option` can only happen once.
    queue: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool and starts exactly `size` workers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSize`] when `size` is zero.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a worker thread.
    ///
    /// # Example
    /// ```
    /// use syncwork::{Error, WorkerPool};
    ///
    /// assert!(matches!(WorkerPool::new(0), Err(Error::InvalidSize { size: 0 })));
    ///
    /// let pool = WorkerPool::new(4).unwrap();
    /// assert_eq!(pool.size(), 4);
    /// ```
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidSize { size });
        }

        let (queue, tasks) = crossbeam_channel::bounded(size);
        let workers = (0..size)
            .map(|worker_id| spawn_worker(worker_id, tasks.clone()))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker pool started with {size} workers");

        Ok(Self {
            size,
            closed: AtomicBool::new(false),
            state: RwLock::new(PoolState {
                queue: Some(queue),
                workers,
            }),
        })
    }

    /// Number of workers the pool was created with.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` once [`WorkerPool::close`] has been called, including
    /// while that call is still draining. Never blocks.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Runs `jobs` as one batch and returns them, in submission order, once
    /// every job has run exactly once.
    ///
    /// Jobs of the batch may execute concurrently and in any relative order.
    /// Everything a job did is visible to the caller when this returns. An
    /// empty batch returns immediately.
    ///
    /// The call blocks while the queue is full and while the batch is
    /// running. There is no timeout; a caller that needs one must race this
    /// call against its own timer and accept that the jobs keep running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolClosed`] if the pool is closed, or if every worker
    /// had already died before the first job could be enqueued. In either case
    /// no job of the batch has been enqueued or run.
    ///
    /// # Panics
    ///
    /// Panics if a job of this batch panicked, since the batch can then never
    /// complete. This includes a panic that kills the last worker while the
    /// rest of the batch is still being enqueued.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use syncwork::WorkerPool;
    ///
    /// let pool = WorkerPool::new(4).unwrap();
    /// let hits = Arc::new(AtomicUsize::new(0));
    /// let jobs: Vec<_> = (0..8)
    ///     .map(|_| {
    ///         let hits = Arc::clone(&hits);
    ///         move || {
    ///             hits.fetch_add(1, Ordering::Relaxed);
    ///         }
    ///     })
    ///     .collect();
    ///
    /// pool.run_batch(jobs).unwrap();
    /// assert_eq!(hits.load(Ordering::Relaxed), 8);
    /// ```
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, jobs), fields(jobs = jobs.len()))
    )]
    pub fn run_batch<J: Job>(&self, jobs: Vec<J>) -> Result<Vec<J>> {
        let count = jobs.len();
        let (done_tx, done_rx) = crossbeam_channel::bounded(count);

        {
            let state = self.state.read();
            let queue = state.queue.as_ref().ok_or(Error::PoolClosed)?;

            for (index, job) in jobs.into_iter().enumerate() {
                // Sending only fails when no worker is left to receive, i.e.
                // every worker died to a panic. Past the first job, part of
                // this batch may already have run, so it is not a rejection.
                if queue
                    .send(Task::batched(index, job, done_tx.clone()))
                    .is_err()
                {
                    if index == 0 {
                        return Err(Error::PoolClosed);
                    }
                    panic!("job panicked while running on the worker pool");
                }
            }
        }
        // Once the batch is enqueued the only senders left are inside its
        // tasks, so a disconnect means a task was dropped without finishing.
        drop(done_tx);

        let mut slots: Vec<Option<J>> = core::iter::repeat_with(|| None).take(count).collect();
        for _ in 0..count {
            match done_rx.recv() {
                Ok((index, job)) => slots[index] = Some(job),
                Err(_) => panic!("job panicked while running on the worker pool"),
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Batch of {count} jobs completed");

        Ok(slots.into_iter().flatten().collect())
    }

    /// Enqueues a single job without waiting for it.
    ///
    /// The job is guaranteed to run before [`WorkerPool::close`] returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolClosed`] if the pool is closed.
    pub fn execute<J: Job>(&self, job: J) -> Result<()> {
        let state = self.state.read();
        let queue = state.queue.as_ref().ok_or(Error::PoolClosed)?;
        queue
            .send(Task::detached(job))
            .map_err(|_| Error::PoolClosed)
    }

    /// Shuts the pool down gracefully.
    ///
    /// The first call closes the queue, waits for the workers to drain every
    /// task already enqueued, and returns after the last worker has exited.
    /// Later calls, sequential or concurrent, return once the first call has
    /// finished and do nothing else. Submissions made after the first call
    /// fail with [`Error::PoolClosed`].
    ///
    /// # Panics
    ///
    /// If a job panicked on a worker, the first such panic is resumed on the
    /// calling thread, unless that thread is already unwinding.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn close(&self) {
        let mut state = self.state.write();
        let Some(queue) = state.queue.take() else {
            return;
        };
        self.closed.store(true, Ordering::Release);

        #[cfg(feature = "tracing")]
        tracing::info!("Closing worker pool, draining queued tasks");

        drop(queue);

        let mut first_panic: Option<Box<dyn Any + Send>> = None;
        for (_worker_id, handle) in state.workers.drain(..).enumerate() {
            if let Err(payload) = handle.join() {
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {_worker_id} exited with a panic");
                first_panic.get_or_insert(payload);
            }
        }
        drop(state);

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker pool closed");

        if let Some(payload) = first_panic {
            if !thread::panicking() {
                resume_unwind(payload);
            }
        }
    }

    /// Alias for [`WorkerPool::close`].
    pub fn join(&self) {
        self.close();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("closed", &self.is_closed())
            .finish()
    }
}
