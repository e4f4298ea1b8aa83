//! Bounded, thread-safe LRU cache for discovered paths.

use hashbrown::HashMap;
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;

use crate::model::TypeKey;

use super::Edge;

const NIL: usize = usize::MAX;

// ============================================================================
// LruCache — hash map + index doubly-linked list
// ============================================================================

/// Single-threaded LRU core: a slab of nodes linked into a recency list,
/// indexed by a hash map. Get and put are O(1); inserting past capacity
/// evicts the least-recently-used entry.
pub(crate) struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

struct Slot<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> LruCache<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be positive");
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Looks up a value and promotes it to most-recently-used.
    pub(crate) fn get(&mut self, key: &K) -> Option<V> {
        let index = *self.map.get(key)?;
        self.detach(index);
        self.push_front(index);
        Some(self.slots[index].value.clone())
    }

    pub(crate) fn put(&mut self, key: K, value: V) {
        if let Some(&index) = self.map.get(&key) {
            self.slots[index].value = value;
            self.detach(index);
            self.push_front(index);
            return;
        }

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Slot { key: key.clone(), value, prev: NIL, next: NIL };
                index
            }
            None => {
                self.slots.push(Slot { key: key.clone(), value, prev: NIL, next: NIL });
                self.slots.len() - 1
            }
        };
        self.map.insert(key, index);
        self.push_front(index);

        if self.map.len() > self.capacity {
            self.evict_tail();
        }
    }

    /// Replaces the capacity, discarding all entries.
    pub(crate) fn resize(&mut self, capacity: usize) {
        *self = Self::new(capacity);
    }

    fn evict_tail(&mut self) {
        let tail = self.tail;
        debug_assert_ne!(tail, NIL);
        self.detach(tail);
        let key = self.slots[tail].key.clone();
        self.map.remove(&key);
        self.free.push(tail);
    }

    fn detach(&mut self, index: usize) {
        let (prev, next) = (self.slots[index].prev, self.slots[index].next);
        if prev != NIL {
            self.slots[prev].next = next;
        } else if self.head == index {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else if self.tail == index {
            self.tail = prev;
        }
        self.slots[index].prev = NIL;
        self.slots[index].next = NIL;
    }

    fn push_front(&mut self, index: usize) {
        self.slots[index].prev = NIL;
        self.slots[index].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = index;
        }
        self.head = index;
        if self.tail == NIL {
            self.tail = index;
        }
    }
}

// ============================================================================
// PathCache — concurrent wrapper keyed by (source, target)
// ============================================================================

pub(crate) type RouteKey = (TypeKey, TypeKey);

/// Route → edge-list cache shared by all searches on a graph.
///
/// The lock is released while a missing path is computed, so two threads
/// racing on the same route may both run the search; the first insert wins
/// and both observe a consistent value.
pub(crate) struct PathCache {
    inner: Mutex<LruCache<RouteKey, Arc<[Edge]>>>,
}

impl PathCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(LruCache::new(capacity)) }
    }

    pub(crate) fn get_or_compute(
        &self,
        key: RouteKey,
        compute: impl FnOnce() -> Vec<Edge>,
    ) -> Arc<[Edge]> {
        if let Some(hit) = self.inner.lock().get(&key) {
            tracing::trace!(source = %key.0, target = %key.1, "path cache hit");
            return hit;
        }

        let computed: Arc<[Edge]> = compute().into();

        let mut cache = self.inner.lock();
        if let Some(existing) = cache.get(&key) {
            return existing;
        }
        cache.put(key, computed.clone());
        computed
    }

    pub(crate) fn resize(&self, capacity: usize) {
        self.inner.lock().resize(capacity);
    }
}
