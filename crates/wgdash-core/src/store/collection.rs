// ── Keyed reactive collection ──
//
// Concurrent storage with O(1) lookups by key and push-based change
// notification via `watch` channels. Unlike a plain map, the snapshot
// keeps the order in which the server returned the entities.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// Entities stored in a [`Collection`] expose a stable string key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for wgdash_api::Device {
    fn key(&self) -> &str {
        &self.name
    }
}

/// A reactive collection for a single entity type.
///
/// Every mutation bumps a version counter and publishes a fresh ordered
/// snapshot to subscribers.
pub(crate) struct Collection<T: Keyed + Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Ordered snapshot, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Keyed + Send + Sync + 'static> Collection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace the whole collection with `items`, keeping their order.
    pub(crate) fn replace_all(&self, items: Vec<T>) {
        let items: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();

        self.by_key.clear();
        for item in &items {
            self.by_key.insert(item.key().to_owned(), Arc::clone(item));
        }

        self.snapshot.send_modify(|snap| *snap = Arc::new(items));
        self.bump_version();
    }

    /// Insert or update one entity. Updated entities keep their position;
    /// new ones are appended. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, entity: T) -> bool {
        let key = entity.key().to_owned();
        let entity = Arc::new(entity);
        let is_new = self.by_key.insert(key.clone(), Arc::clone(&entity)).is_none();

        self.snapshot.send_modify(|snap| {
            let mut next: Vec<Arc<T>> = snap.as_ref().clone();
            match next.iter().position(|e| e.key() == key) {
                Some(pos) => next[pos] = entity,
                None => next.push(entity),
            }
            *snap = Arc::new(next);
        });
        self.bump_version();

        is_new
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.snapshot.send_modify(|snap| {
                let next: Vec<Arc<T>> = snap.iter().filter(|e| e.key() != key).cloned().collect();
                *snap = Arc::new(next);
            });
            self.bump_version();
        }
        removed
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn clear(&self) {
        self.replace_all(Vec::new());
    }

    /// Number of entities in the snapshot.
    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        key: String,
        value: u32,
    }

    impl Keyed for Item {
        fn key(&self) -> &str {
            &self.key
        }
    }

    fn item(key: &str, value: u32) -> Item {
        Item {
            key: key.into(),
            value,
        }
    }

    fn keys(col: &Collection<Item>) -> Vec<String> {
        col.snapshot().iter().map(|i| i.key.clone()).collect()
    }

    #[test]
    fn replace_all_keeps_order_and_drops_old_entries() {
        let col = Collection::new();
        col.replace_all(vec![item("a", 1), item("b", 2), item("c", 3)]);
        col.replace_all(vec![item("z", 9), item("a", 10)]);

        assert_eq!(keys(&col), ["z", "a"]);
        assert!(col.get("b").is_none());
        assert_eq!(col.get("a").unwrap().value, 10);
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn upsert_updates_in_place_or_appends() {
        let col = Collection::new();
        col.replace_all(vec![item("a", 1), item("b", 2)]);

        assert!(!col.upsert(item("a", 5)));
        assert!(col.upsert(item("c", 3)));

        assert_eq!(keys(&col), ["a", "b", "c"]);
        assert_eq!(col.snapshot()[0].value, 5);
    }

    #[test]
    fn remove_cleans_snapshot() {
        let col = Collection::new();
        col.replace_all(vec![item("a", 1), item("b", 2)]);

        assert_eq!(col.remove("a").unwrap().value, 1);
        assert!(col.remove("a").is_none());
        assert_eq!(keys(&col), ["b"]);
    }

    #[test]
    fn every_mutation_bumps_version_and_notifies() {
        let col: Collection<Item> = Collection::new();
        let rx = col.subscribe();
        assert_eq!(col.version(), 0);

        col.replace_all(vec![item("a", 1)]);
        col.upsert(item("b", 2));
        col.clear();

        assert_eq!(col.version(), 3);
        assert!(rx.has_changed().unwrap());
        assert!(col.is_empty());
    }
}
