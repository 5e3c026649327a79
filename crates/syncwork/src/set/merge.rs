use crate::set::ConcurrentSet;
use std::thread;

/// Inserts every value of every slice into `set`, one scoped thread per slice.
///
/// Each thread checks [`ConcurrentSet::contains`] before calling
/// [`ConcurrentSet::insert`]. Duplicates are common in this workload and the
/// lookup only needs a shared lock on the reader-writer implementations.
///
/// # Example
/// ```
/// use syncwork::{ConcurrentSet, RwLockSet, merge_unique};
///
/// let set = RwLockSet::new();
/// merge_unique(&set, &[&[1, 2, 3][..], &[3, 4, 1][..]]);
/// assert_eq!(set.len(), 4);
/// ```
pub fn merge_unique<S, T>(set: &S, slices: &[&[T]])
where
    S: ConcurrentSet<T>,
    T: Clone + Sync,
{
    thread::scope(|s| {
        for &slice in slices {
            s.spawn(move || {
                for value in slice {
                    if !set.contains(value) {
                        set.insert(value.clone());
                    }
                }
            });
        }
    });
}
