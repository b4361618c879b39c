//! Locked Cache Module
//!
//! Thread-safe wrapper around the LRU store.

use parking_lot::Mutex;

use crate::cache::{ByteView, EvictionCallback, LruStore};

struct Inner {
    store: Option<LruStore>,
    /// Held until the store is constructed, then moved into it
    on_evicted: Option<EvictionCallback>,
}

// == Locked Cache ==
/// Exclusive-lock wrapper over [`LruStore`].
///
/// The underlying store is constructed lazily on the first `add`, so a
/// group that never writes allocates nothing. Promotion on `get` mutates
/// the recency order, so both `get` and `add` take the exclusive lock.
pub struct LockedCache {
    max_bytes: usize,
    inner: Mutex<Inner>,
}

impl LockedCache {
    // == Constructors ==
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(Inner {
                store: None,
                on_evicted: None,
            }),
        }
    }

    /// Like `new`, with a callback invoked for every evicted entry.
    pub fn with_eviction_callback(max_bytes: usize, on_evicted: EvictionCallback) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(Inner {
                store: None,
                on_evicted: Some(on_evicted),
            }),
        }
    }

    // == Get ==
    /// Looks up `key`, promoting it on a hit. A miss before the first write
    /// is immediate: no store has been constructed yet.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        inner.store.as_mut()?.get(key)
    }

    // == Add ==
    /// Admits `key`, constructing the store on first use.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        if inner.store.is_none() {
            let on_evicted = inner.on_evicted.take();
            inner.store = Some(LruStore::new(self.max_bytes, on_evicted));
        }
        if let Some(store) = inner.store.as_mut() {
            store.add(key, value);
        }
    }

    // == Introspection ==
    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.inner.lock().store.as_ref().map_or(0, LruStore::len)
    }

    /// Returns true if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the accounted size in bytes.
    pub fn nbytes(&self) -> usize {
        self.inner.lock().store.as_ref().map_or(0, LruStore::nbytes)
    }

    /// Returns true if `key` is resident, without promoting it.
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .store
            .as_ref()
            .is_some_and(|store| store.contains(key))
    }
}
