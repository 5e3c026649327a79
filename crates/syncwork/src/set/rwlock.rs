use crate::set::ConcurrentSet;
use core::hash::Hash;
use parking_lot::RwLock;
use std::collections::HashSet;

/// A [`HashSet`] behind a single [`RwLock`].
///
/// Lookups share the lock; inserts take it exclusively. Read-heavy workloads
/// scale, write-heavy ones behave like [`MutexSet`].
///
/// [`MutexSet`]: crate::MutexSet
#[derive(Debug)]
pub struct RwLockSet<T> {
    data: RwLock<HashSet<T>>,
}

impl<T: Eq + Hash> RwLockSet<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: RwLock::new(HashSet::with_capacity(capacity)),
        }
    }
}

impl<T: Eq + Hash> Default for RwLockSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentSet<T> for RwLockSet<T>
where
    T: Eq + Hash + Clone + Send + Sync,
{
    fn insert(&self, value: T) -> bool {
        self.data.write().insert(value)
    }

    fn contains(&self, value: &T) -> bool {
        self.data.read().contains(value)
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }

    fn values(&self) -> Vec<T> {
        self.data.read().iter().cloned().collect()
    }
}
