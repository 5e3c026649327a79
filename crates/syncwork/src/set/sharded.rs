use crate::set::ConcurrentSet;
use core::hash::{BuildHasher, Hash};
use parking_lot::RwLock;
use std::collections::{HashSet, hash_map::RandomState};

#[cfg(feature = "cache-padded")]
type Shard<T> = crossbeam_utils::CachePadded<RwLock<HashSet<T>>>;
#[cfg(not(feature = "cache-padded"))]
type Shard<T> = RwLock<HashSet<T>>;

/// Default number of shards for [`ShardedSet::new`].
pub const DEFAULT_SHARDS: usize = 16;

/// A set split into independently locked shards.
///
/// Each value lives in the shard picked by its hash, so operations on
/// different shards never contend. With the `cache-padded` feature every shard
/// sits on its own cache line to avoid false sharing between neighbouring
/// locks.
///
/// [`ConcurrentSet::len`] and [`ConcurrentSet::values`] visit the shards one
/// after another and are not an atomic snapshot under concurrent inserts.
pub struct ShardedSet<T> {
    shards: Box<[Shard<T>]>,
    hasher: RandomState,
}

impl<T: Eq + Hash> ShardedSet<T> {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Creates a set with `shards` locks. Zero is treated as one.
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1)).map(|_| new_shard()).collect();
        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for(&self, value: &T) -> &Shard<T> {
        let index = self.hasher.hash_one(value) as usize % self.shards.len();
        &self.shards[index]
    }
}

fn new_shard<T>() -> Shard<T> {
    #[cfg(feature = "cache-padded")]
    {
        crossbeam_utils::CachePadded::new(RwLock::new(HashSet::new()))
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        RwLock::new(HashSet::new())
    }
}

impl<T: Eq + Hash> Default for ShardedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConcurrentSet<T> for ShardedSet<T>
where
    T: Eq + Hash + Clone + Send + Sync,
{
    fn insert(&self, value: T) -> bool {
        self.shard_for(&value).write().insert(value)
    }

    fn contains(&self, value: &T) -> bool {
        self.shard_for(value).read().contains(value)
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    fn values(&self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.len());
        for shard in self.shards.iter() {
            values.extend(shard.read().iter().cloned());
        }
        values
    }
}
