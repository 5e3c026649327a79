use crate::pool::task::Task;
use crossbeam_channel::Receiver;
use std::thread::{self, JoinHandle};

/// Spawns a named worker thread draining `tasks`.
///
/// # Panics
///
/// Panics if the OS refuses to create the thread, as [`std::thread::spawn`]
/// does.
pub(crate) fn spawn_worker(worker_id: usize, tasks: Receiver<Task>) -> JoinHandle<()> {
    let spawned = thread::Builder::new()
        .name(format!("syncwork-worker-{worker_id}"))
        .spawn(move || worker_loop(worker_id, tasks));

    match spawned {
        Ok(handle) => handle,
        Err(e) => panic!("failed to spawn worker {worker_id}: {e}"),
    }
}

/// Runs tasks until the queue is closed and empty.
///
/// Tasks are executed synchronously, one at a time, in the order this worker
/// dequeues them. A task that panics unwinds through here and ends the
/// worker; the payload is recovered by [`WorkerPool::close`].
///
/// [`WorkerPool::close`]: crate::WorkerPool::close
fn worker_loop(_worker_id: usize, tasks: Receiver<Task>) {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} started");

    for task in tasks {
        task.execute();
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} stopped");
}
