//! Group Module
//!
//! Named cache namespaces. A group answers from its local tier, fetches
//! from the owning peer, or invokes the origin loader, with all miss work
//! funneled through the single-flight coordinator.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{ByteView, GroupStats, LockedCache, StatsSnapshot};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::FlightGroup;

// == Loader Capability ==
/// The authoritative source consulted on a cache miss.
///
/// A returned error is surfaced to the caller and never cached.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapter turning a plain closure into a [`Getter`].
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key)
    }
}

// == Group Registry ==
static GROUPS: OnceLock<RwLock<HashMap<String, Arc<Group>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, Arc<Group>>> {
    GROUPS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Creates and registers a group under `name`.
///
/// # Panics
/// Panics if a group with the same name is already registered; duplicate
/// names are a programmer error.
pub fn new_group(name: &str, cache_bytes: usize, getter: Arc<dyn Getter>) -> Arc<Group> {
    let stats = Arc::new(GroupStats::default());
    let eviction_stats = Arc::clone(&stats);
    let main_cache = LockedCache::with_eviction_callback(
        cache_bytes,
        Box::new(move |key, _value| {
            debug!(key, "entry evicted");
            eviction_stats.record_eviction();
        }),
    );

    let group = Arc::new(Group {
        name: name.to_string(),
        getter,
        main_cache,
        peers: OnceLock::new(),
        loader: FlightGroup::new(),
        stats,
    });

    let mut groups = registry().write();
    if groups.contains_key(name) {
        panic!("group {name} is already registered");
    }
    groups.insert(name.to_string(), Arc::clone(&group));
    group
}

/// Returns the group registered under `name`, if any.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    registry().read().get(name).cloned()
}

// == Group ==
/// A named cache namespace with its own byte budget and loader.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: LockedCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: FlightGroup<ByteView>,
    stats: Arc<GroupStats>,
}

impl Group {
    /// Returns the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assigns the peer picker.
    ///
    /// # Panics
    /// Panics on a second call; a group's picker is assigned at most once.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group {}", self.name);
        }
    }

    /// Looks up `key`: local hit, else peer fetch or origin load under
    /// single-flight.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::KeyRequired);
        }

        if let Some(view) = self.main_cache.get(key) {
            self.stats.record_hit();
            debug!(group = %self.name, key, "cache hit");
            return Ok(view);
        }

        self.stats.record_miss();
        self.load(key).await
    }

    /// Miss path. Runs under single-flight, so any number of concurrent
    /// misses for one key produce at most one peer request or origin load.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.loader
            .run(key, || async {
                if let Some(peers) = self.peers.get() {
                    if let Some(peer) = peers.pick_peer(key) {
                        match self.get_from_peer(peer.as_ref(), key).await {
                            Ok(view) => {
                                self.stats.record_peer_fetch();
                                debug!(group = %self.name, key, "fetched from peer");
                                return Ok(view);
                            }
                            Err(err) => {
                                self.stats.record_peer_failure();
                                warn!(
                                    group = %self.name,
                                    key,
                                    %err,
                                    "peer fetch failed, loading locally"
                                );
                            }
                        }
                    }
                }
                self.get_locally(key).await
            })
            .await
    }

    /// Fetches `key` from its owner. The response is not admitted to the
    /// local tier: the owner already caches it, and caching it here would
    /// duplicate the value on every fan-in node.
    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        Ok(ByteView::from(bytes))
    }

    /// Invokes the origin loader and admits the value to the local tier.
    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = match self.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.record_loader_error();
                return Err(err);
            }
        };
        let view = ByteView::from(bytes);
        self.main_cache.add(key, view.clone());
        self.stats.record_local_load();
        debug!(group = %self.name, key, len = view.len(), "loaded from origin");
        Ok(view)
    }

    /// Returns a snapshot of the group's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of entries resident in the local tier.
    pub fn cache_len(&self) -> usize {
        self.main_cache.len()
    }
}
