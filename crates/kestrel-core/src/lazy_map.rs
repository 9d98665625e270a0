use std::collections::BTreeMap;

/// An ordered map that builds missing values on demand.
///
/// Reading a key that has never been seen runs the factory once and stores the
/// result, so every key yields the same entry for the lifetime of the map.
/// Entries are never removed.
pub struct LazyMap<K, V> {
    entries: BTreeMap<K, V>,
    factory: Box<dyn Fn(&K) -> V + Send + Sync>,
}

impl<K: Ord + Clone, V> LazyMap<K, V> {
    pub fn new(factory: impl Fn(&K) -> V + Send + Sync + 'static) -> Self {
        Self {
            entries: BTreeMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Returns the entry for `key`, creating it first if needed.
    pub fn get_or_create(&mut self, key: &K) -> &mut V {
        let factory = &self.factory;
        self.entries
            .entry(key.clone())
            .or_insert_with(|| factory(key))
    }

    /// Returns the entry for `key` without creating it.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries.iter_mut()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for LazyMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn factory_runs_once_per_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut map = LazyMap::new(move |k: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            k * 10
        });

        *map.get_or_create(&1) += 1;
        assert_eq!(*map.get_or_create(&1), 11);
        assert_eq!(*map.get_or_create(&2), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn get_does_not_create() {
        let mut map = LazyMap::new(|_: &u32| 0);
        assert!(map.get(&7).is_none());
        assert!(map.is_empty());
        map.get_or_create(&7);
        assert!(map.contains_key(&7));
    }

    #[test]
    fn iterates_in_key_order() {
        let mut map = LazyMap::new(|k: &u32| *k);
        for k in [5, 1, 3] {
            map.get_or_create(&k);
        }
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    }
}
