use std::collections::BTreeMap;

/// Occurrence counters of accepted frames, keyed by message type
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MessageStats<K: Ord> {
    counts: BTreeMap<K, u32>,
    total: u32,
}

impl<K: Ord> Default for MessageStats<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            total: 0,
        }
    }
}

impl<K: Ord + Copy> MessageStats<K> {
    pub fn record(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
        self.total += 1;
    }

    /// Occurrences of `key`, zero if never seen
    pub fn count(&self, key: K) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn reset(&mut self) {
        self.counts.clear();
        self.total = 0;
    }

    /// Per-key counts in key order
    pub fn iter(&self) -> impl Iterator<Item = (K, u32)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}
