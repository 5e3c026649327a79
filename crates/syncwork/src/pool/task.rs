use crate::pool::Job;
use crossbeam_channel::Sender;

/// A queued unit of work, as seen by a worker.
///
/// A batched task pairs its job with the batch's completion sender. The job
/// travels back to the submitter through that sender once it has run, so the
/// receive in [`WorkerPool::run_batch`] happens-after every side effect of
/// the job.
///
/// [`WorkerPool::run_batch`]: crate::WorkerPool::run_batch
pub(crate) struct Task {
    payload: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// Wraps the `index`-th job of a batch.
    pub(crate) fn batched<J: Job>(index: usize, mut job: J, done: Sender<(usize, J)>) -> Self {
        Self {
            payload: Box::new(move || {
                job.run();
                // The channel is sized to the batch, so this never blocks. It
                // only fails if the submitter itself unwound.
                let _ = done.send((index, job));
            }),
        }
    }

    /// Wraps a job nobody waits for individually.
    pub(crate) fn detached<J: Job>(mut job: J) -> Self {
        Self {
            payload: Box::new(move || job.run()),
        }
    }

    pub(crate) fn execute(self) {
        (self.payload)();
    }
}
