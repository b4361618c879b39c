//! LRU Store Module
//!
//! Byte-accounted least-recently-used store backing each cache group.
//!
//! Entries are linked most-recent-first through an arena of slots, with a
//! hash index from key to slot id. `get`, `add` and `remove_oldest` are all
//! O(1) amortized: promotion and eviction splice links instead of shifting
//! elements.

use std::collections::HashMap;

use crate::cache::ByteView;

/// Callback invoked with the key and value of every evicted entry.
pub type EvictionCallback = Box<dyn FnMut(&str, &ByteView) + Send>;

/// Sentinel slot id marking the end of the recency list.
const NIL: usize = usize::MAX;

struct Slot {
    key: String,
    value: ByteView,
    prev: usize,
    next: usize,
}

// == LRU Store ==
/// Ordered key/value store with byte-accounted LRU eviction.
///
/// Each entry accounts for `key.len() + value.len()` bytes. After any `add`
/// the store evicts from the cold end until the accounted size fits the
/// budget again, which may leave the store empty. A budget of zero means
/// unbounded.
///
/// Not safe for concurrent use; `LockedCache` provides serialization.
pub struct LruStore {
    /// Byte budget, 0 = unbounded
    max_bytes: usize,
    /// Currently accounted bytes
    nbytes: usize,
    /// Slot arena; freed slots are recycled through `free`
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    /// Key -> slot id
    index: HashMap<String, usize>,
    /// Most recently used slot id
    head: usize,
    /// Least recently used slot id
    tail: usize,
    on_evicted: Option<EvictionCallback>,
}

impl LruStore {
    // == Constructor ==
    /// Creates a store with the given byte budget and optional eviction
    /// callback.
    pub fn new(max_bytes: usize, on_evicted: Option<EvictionCallback>) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            on_evicted,
        }
    }

    // == Get ==
    /// Returns the value for `key` and promotes the entry to most recent.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        let id = *self.index.get(key)?;
        self.detach(id);
        self.attach_front(id);
        self.slots[id].as_ref().map(|slot| slot.value.clone())
    }

    // == Add ==
    /// Inserts or replaces `key`, promotes it to most recent, then evicts
    /// least-recent entries until the byte budget holds.
    ///
    /// A single call may evict multiple entries, including the one just
    /// added if it alone exceeds the budget.
    pub fn add(&mut self, key: &str, value: ByteView) {
        if let Some(&id) = self.index.get(key) {
            self.detach(id);
            self.attach_front(id);
            if let Some(slot) = self.slots[id].as_mut() {
                let old_len = slot.value.len();
                let new_len = value.len();
                slot.value = value;
                self.nbytes = self.nbytes + new_len - old_len;
            }
        } else {
            let slot = Slot {
                key: key.to_string(),
                value,
                prev: NIL,
                next: NIL,
            };
            self.nbytes += slot.key.len() + slot.value.len();
            let id = match self.free.pop() {
                Some(id) => {
                    self.slots[id] = Some(slot);
                    id
                }
                None => {
                    self.slots.push(Some(slot));
                    self.slots.len() - 1
                }
            };
            self.index.insert(key.to_string(), id);
            self.attach_front(id);
        }

        while self.max_bytes > 0 && self.nbytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    // == Remove Oldest ==
    /// Evicts the least-recent entry. No-op on an empty store.
    pub fn remove_oldest(&mut self) {
        if self.tail == NIL {
            return;
        }
        let id = self.tail;
        self.detach(id);
        let Some(slot) = self.slots[id].take() else {
            return;
        };
        self.free.push(id);
        self.index.remove(&slot.key);
        self.nbytes -= slot.key.len() + slot.value.len();
        if let Some(callback) = self.on_evicted.as_mut() {
            callback(&slot.key, &slot.value);
        }
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the currently accounted size in bytes.
    pub fn nbytes(&self) -> usize {
        self.nbytes
    }

    /// Returns true if `key` is present, without promoting it.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Link Maintenance ==
    /// Unlinks `id` from the recency list without freeing its slot.
    fn detach(&mut self, id: usize) {
        let (prev, next) = match self.slots[id].as_ref() {
            Some(slot) => (slot.prev, slot.next),
            None => return,
        };
        if prev == NIL {
            self.head = next;
        } else if let Some(slot) = self.slots[prev].as_mut() {
            slot.next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else if let Some(slot) = self.slots[next].as_mut() {
            slot.prev = prev;
        }
    }

    /// Links a detached `id` in as the most-recent entry.
    fn attach_front(&mut self, id: usize) {
        let head = self.head;
        if let Some(slot) = self.slots[id].as_mut() {
            slot.prev = NIL;
            slot.next = head;
        }
        if head != NIL {
            if let Some(slot) = self.slots[head].as_mut() {
                slot.prev = id;
            }
        }
        self.head = id;
        if self.tail == NIL {
            self.tail = id;
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn unbounded() -> LruStore {
        LruStore::new(0, None)
    }

    #[test]
    fn test_store_new() {
        let store = unbounded();
        assert_eq!(store.len(), 0);
        assert_eq!(store.nbytes(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_and_get() {
        let mut store = unbounded();

        store.add("key1", ByteView::from("1234"));

        assert_eq!(store.get("key1"), Some(ByteView::from("1234")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.nbytes(), "key1".len() + "1234".len());
    }

    #[test]
    fn test_get_miss() {
        let mut store = unbounded();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_replace_adjusts_accounting() {
        let mut store = unbounded();

        store.add("k", ByteView::from("abcd"));
        store.add("k", ByteView::from("xy"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k"), Some(ByteView::from("xy")));
        assert_eq!(store.nbytes(), "k".len() + "xy".len());

        store.add("k", ByteView::from("longer value"));
        assert_eq!(store.nbytes(), "k".len() + "longer value".len());
    }

    #[test]
    fn test_eviction_respects_budget() {
        // Budget for two 4-byte entries.
        let mut store = LruStore::new(8, None);

        store.add("k1", ByteView::from("v1"));
        store.add("k2", ByteView::from("v2"));
        store.add("k3", ByteView::from("v3"));

        assert_eq!(store.len(), 2);
        assert!(store.nbytes() <= 8);
        assert!(!store.contains("k1"));
        assert!(store.contains("k2"));
        assert!(store.contains("k3"));
    }

    #[test]
    fn test_get_protects_from_eviction() {
        // maxBytes=12 holds three 4-byte entries.
        let mut store = LruStore::new(12, None);

        store.add("k1", ByteView::from("v1"));
        store.add("k2", ByteView::from("v2"));
        store.add("k3", ByteView::from("v3"));
        assert!(store.get("k1").is_some());
        store.add("k4", ByteView::from("v4"));

        assert!(store.contains("k1"));
        assert!(!store.contains("k2"));
        assert!(store.contains("k3"));
        assert!(store.contains("k4"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_single_add_can_evict_many() {
        let mut store = LruStore::new(12, None);

        store.add("k1", ByteView::from("v1"));
        store.add("k2", ByteView::from("v2"));
        store.add("k3", ByteView::from("v3"));

        // An 8-byte entry forces out both cold entries.
        store.add("big1", ByteView::from("wxyz"));

        assert_eq!(store.len(), 2);
        assert!(!store.contains("k1"));
        assert!(!store.contains("k2"));
        assert!(store.contains("k3"));
        assert!(store.contains("big1"));
    }

    #[test]
    fn test_oversized_entry_is_evicted_too() {
        let mut store = LruStore::new(4, None);

        store.add("huge", ByteView::from("far too large to fit"));

        // The budget must hold even if that empties the store.
        assert!(store.is_empty());
        assert_eq!(store.nbytes(), 0);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut store = unbounded();
        for i in 0..100 {
            store.add(&format!("key{i}"), ByteView::from("value"));
        }
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_remove_oldest_on_empty() {
        let mut store = unbounded();
        store.remove_oldest();
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_oldest_order() {
        let mut store = unbounded();
        store.add("a", ByteView::from("1"));
        store.add("b", ByteView::from("2"));
        store.add("c", ByteView::from("3"));
        assert!(store.get("a").is_some());

        store.remove_oldest();
        assert!(!store.contains("b"));

        store.remove_oldest();
        assert!(!store.contains("c"));
        assert!(store.contains("a"));
    }

    #[test]
    fn test_eviction_callback() {
        let evicted: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut store = LruStore::new(
            8,
            Some(Box::new(move |key, _value| {
                sink.lock().unwrap().push(key.to_string());
            })),
        );

        store.add("k1", ByteView::from("v1"));
        store.add("k2", ByteView::from("v2"));
        store.add("k3", ByteView::from("v3"));

        assert_eq!(*evicted.lock().unwrap(), vec!["k1".to_string()]);
    }

    #[test]
    fn test_slot_reuse_after_eviction() {
        let mut store = LruStore::new(8, None);
        for i in 0..50 {
            store.add(&format!("k{i}"), ByteView::from("v0"));
        }
        // The arena must not grow past the live set plus one in-flight slot.
        assert!(store.slots.len() <= 3);
        assert!(store.nbytes() <= 8);
    }
}
