use crate::types::ItemId;
use indexmap::IndexSet;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Maps a field value to the identifiers filed under it.
///
/// Buckets keep identifiers in insertion order and never stay empty: the key
/// is dropped as soon as its last identifier is removed.
#[derive(Debug, Clone)]
pub struct KeyIndex<K> {
    buckets: BTreeMap<K, IndexSet<ItemId>>,
}

impl<K: Ord> KeyIndex<K> {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, key: K, id: ItemId) {
        self.buckets.entry(key).or_default().insert(id);
    }

    pub fn remove<Q>(&mut self, key: &Q, id: &ItemId)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.shift_remove(id);
            if bucket.is_empty() {
                self.buckets.remove(key);
            }
        }
    }

    /// `None` means the key has no bucket; an existing bucket is never empty.
    pub fn lookup<Q>(&self, key: &Q) -> Option<&IndexSet<ItemId>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.buckets.get(key)
    }

    /// Non-empty keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.keys()
    }

    pub fn bucket_sizes(&self) -> impl Iterator<Item = (&K, usize)> {
        self.buckets.iter().map(|(key, bucket)| (key, bucket.len()))
    }

    /// Identifiers under keys in `[start, end]`, ascending by key, then by insertion.
    /// Yields nothing when `start > end`.
    pub fn range<'a, Q>(&'a self, start: &'a Q, end: &'a Q) -> impl Iterator<Item = ItemId> + Clone + 'a
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let upper = if start <= end {
            Bound::Included(end)
        } else {
            Bound::Excluded(start)
        };
        self.buckets
            .range::<Q, _>((Bound::Included(start), upper))
            .flat_map(|(_, bucket)| bucket.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<K: Ord> Default for KeyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
