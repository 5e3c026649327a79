use crate::set::ConcurrentSet;
use core::hash::Hash;
use parking_lot::Mutex;
use std::collections::HashSet;

/// A [`HashSet`] behind a single [`Mutex`].
///
/// Lookups serialize with each other as well as with inserts.
#[derive(Debug)]
pub struct MutexSet<T> {
    data: Mutex<HashSet<T>>,
}

impl<T: Eq + Hash> MutexSet<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Mutex::new(HashSet::with_capacity(capacity)),
        }
    }
}

impl<T: Eq + Hash> Default for MutexSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentSet<T> for MutexSet<T>
where
    T: Eq + Hash + Clone + Send,
{
    fn insert(&self, value: T) -> bool {
        self.data.lock().insert(value)
    }

    fn contains(&self, value: &T) -> bool {
        self.data.lock().contains(value)
    }

    fn len(&self) -> usize {
        self.data.lock().len()
    }

    fn values(&self) -> Vec<T> {
        self.data.lock().iter().cloned().collect()
    }
}
