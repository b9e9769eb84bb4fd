//! Insertion-ordered frequency counting.

use std::collections::HashMap;
use std::hash::Hash;

/// A frequency table that remembers the order in which keys were first seen.
///
/// Ties in [`Tally::most_common`] are resolved in favour of the key seen
/// first, which keeps style selection deterministic for a given reading order.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K: Eq + Hash + Clone> Tally<K> {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Add `weight` observations of `key`.
    ///
    /// A zero weight still registers the key, so it can win when nothing
    /// else has been counted.
    pub fn add(&mut self, key: K, weight: usize) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += weight,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, weight));
            }
        }
    }

    /// Add a single observation of `key`.
    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    /// The key with the highest count, earliest-seen on ties.
    pub fn most_common(&self) -> Option<&K> {
        let mut best: Option<&(K, usize)> = None;
        for entry in &self.entries {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(k, _)| k)
    }

    /// Count recorded for `key`.
    pub fn count(&self, key: &K) -> usize {
        self.index.get(key).map_or(0, |&i| self.entries[i].1)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys with counts in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(k, c)| (k, *c))
    }
}

impl<K: Eq + Hash + Clone> Default for Tally<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.increment(key);
        }
        tally
    }
}
