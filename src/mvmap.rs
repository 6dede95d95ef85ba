//! Insertion-ordered multi-value map used for NFA transition storage.

use indexmap::IndexMap;
use std::hash::Hash;

/// A map from keys to the ordered list of values inserted under them.
///
/// Backed by an [`IndexMap`] so key iteration follows first-insertion order,
/// which keeps traversals over the automaton graph deterministic from run to
/// run.
#[derive(Debug, Clone)]
pub(crate) struct MultiMap<K, V> {
    entries: IndexMap<K, Vec<V>>,
}

impl<K: Eq + Hash, V> MultiMap<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Append `value` to the list stored under `key`.
    pub(crate) fn put(&mut self, key: K, value: V) {
        self.entries.entry(key).or_default().push(value);
    }

    /// The values inserted under `key`, oldest first. Empty when the key is
    /// unknown.
    pub(crate) fn get(&self, key: &K) -> &[V] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    /// Distinct keys in first-insertion order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_appends_in_order() {
        let mut map = MultiMap::new();
        map.put("digit", 1);
        map.put("digit", 2);

        assert_eq!(map.get(&"digit"), &[1, 2]);
    }

    #[test]
    fn test_get_unknown_key_is_empty() {
        let map: MultiMap<&str, u32> = MultiMap::new();

        assert!(map.get(&"missing").is_empty());
    }

    #[test]
    fn test_keys_follow_first_insertion_order() {
        let mut map = MultiMap::new();
        map.put('b', 0);
        map.put('a', 1);
        map.put('b', 2);

        assert_eq!(map.keys().collect::<Vec<_>>(), vec![&'b', &'a']);
    }
}
