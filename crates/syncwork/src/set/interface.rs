/// A set that can be shared between threads by reference.
///
/// Implementations differ only in their locking strategy, which makes them
/// interchangeable in benchmarks:
///
/// - [`MutexSet`]: one exclusive lock for every operation
/// - [`RwLockSet`]: one reader-writer lock, concurrent lookups
/// - [`ShardedSet`]: several reader-writer locks chosen by hash
///
/// [`MutexSet`]: crate::MutexSet
/// [`RwLockSet`]: crate::RwLockSet
/// [`ShardedSet`]: crate::ShardedSet
pub trait ConcurrentSet<T>: Sync {
    /// Adds `value`, returning `true` if it was not present yet.
    fn insert(&self, value: T) -> bool;

    /// Returns `true` if `value` is present.
    fn contains(&self, value: &T) -> bool;

    /// Number of distinct values.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot of every value, in no particular order.
    fn values(&self) -> Vec<T>;
}
