/// A self-contained unit of work executed by a [`WorkerPool`].
///
/// The pool never interprets what a job does. A job that can fail must keep
/// its own outcome (an error field, a flag, a counter) so the submitter can
/// inspect it once [`WorkerPool::run_batch`] hands the job back. Panics are
/// not caught by the pool; wrap fallible bodies in [`catch_panic`] when a
/// panic must not take a worker down.
///
/// Any `FnMut() + Send + 'static` closure is a job.
///
/// # Example
/// ```
/// use syncwork::{Job, WorkerPool};
///
/// struct Square {
///     input: u64,
///     output: Option<u64>,
/// }
///
/// impl Job for Square {
///     fn run(&mut self) {
///         self.output = Some(self.input * self.input);
///     }
/// }
///
/// let pool = WorkerPool::new(2).unwrap();
/// let jobs = (1..=4).map(|input| Square { input, output: None }).collect();
/// let done = pool.run_batch(jobs).unwrap();
///
/// let squares: Vec<_> = done.iter().filter_map(|job| job.output).collect();
/// assert_eq!(squares, [1, 4, 9, 16]);
/// ```
///
/// [`WorkerPool`]: crate::WorkerPool
/// [`WorkerPool::run_batch`]: crate::WorkerPool::run_batch
/// [`catch_panic`]: crate::catch_panic
pub trait Job: Send + 'static {
    /// Executes the job. Called exactly once per submission.
    fn run(&mut self);
}

impl<F> Job for F
where
    F: FnMut() + Send + 'static,
{
    fn run(&mut self) {
        self();
    }
}
