//! HTTP Peer Pool Module
//!
//! Binds the consistent-hash ring to concrete peer clients and implements
//! the outbound half of the inter-node protocol.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::ring::HashRing;

/// Default URL prefix for the inter-node protocol.
pub const DEFAULT_BASE_PATH: &str = "/_hcache/";
/// Default number of virtual nodes per peer.
pub const DEFAULT_REPLICAS: usize = 50;

/// Timeout for a single peer request; a timed-out fetch behaves like any
/// other peer failure.
const PEER_TIMEOUT: Duration = Duration::from_secs(10);

struct PoolInner {
    ring: HashRing,
    peers: HashMap<String, Arc<HttpPeer>>,
}

// == HTTP Pool ==
/// Peer pool for one node: the hash ring over the configured peer set and
/// the clients used to reach each peer.
pub struct HttpPool {
    /// This node's own entry in the peer list
    self_url: String,
    base_path: String,
    replicas: usize,
    client: reqwest::Client,
    inner: Mutex<PoolInner>,
}

impl HttpPool {
    // == Constructors ==
    /// Creates a pool with the default base path and replication factor.
    pub fn new(self_url: &str) -> Result<Self> {
        Self::with_config(self_url, DEFAULT_BASE_PATH, DEFAULT_REPLICAS)
    }

    /// Creates a pool with explicit protocol settings.
    ///
    /// # Panics
    /// Panics if `replicas` is zero, or if `base_path` is not of the form
    /// `/prefix/`.
    pub fn with_config(self_url: &str, base_path: &str, replicas: usize) -> Result<Self> {
        assert!(
            base_path.len() > 1 && base_path.starts_with('/') && base_path.ends_with('/'),
            "base path must be of the form /prefix/"
        );
        let client = reqwest::Client::builder()
            .timeout(PEER_TIMEOUT)
            .build()
            .map_err(|err| CacheError::Internal(format!("http client: {err}")))?;
        Ok(Self {
            self_url: self_url.trim_end_matches('/').to_string(),
            base_path: base_path.to_string(),
            replicas,
            client,
            inner: Mutex::new(PoolInner {
                ring: HashRing::new(replicas),
                peers: HashMap::new(),
            }),
        })
    }

    /// Returns the protocol base path served by this pool.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns this node's own URL.
    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    // == Set Peers ==
    /// Replaces the peer set. The lock is held across ring construction
    /// and client-map replacement, so `pick_peer` never observes a ring
    /// that disagrees with the client map.
    ///
    /// `peers` lists every node of the cluster, including this one.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|peer| peer.into().trim_end_matches('/').to_string())
            .collect();

        let mut inner = self.inner.lock();
        inner.ring = HashRing::new(self.replicas);
        inner.ring.add(peers.iter().cloned());
        inner.peers = peers
            .iter()
            .map(|peer| {
                let client =
                    HttpPeer::with_client(peer, &self.base_path, self.client.clone());
                (peer.clone(), Arc::new(client))
            })
            .collect();
        drop(inner);
        info!(peers = peers.len(), "peer set replaced");
    }
}

impl PeerPicker for HttpPool {
    /// Looks up the key's owner. Returns `None` when this node owns the
    /// key or the ring is empty, signalling "serve locally".
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let inner = self.inner.lock();
        let owner = inner.ring.get(key)?;
        if owner == self.self_url {
            return None;
        }
        let peer = inner.peers.get(owner).cloned()?;
        debug!(key, peer = owner, "picked peer");
        Some(peer as Arc<dyn PeerGetter>)
    }
}

// == HTTP Peer ==
/// Client for one remote peer.
pub struct HttpPeer {
    /// Peer URL joined with the protocol base path
    base_url: String,
    client: reqwest::Client,
}

impl HttpPeer {
    /// Creates a standalone client for the peer at `peer_url`.
    pub fn new(peer_url: &str, base_path: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PEER_TIMEOUT)
            .build()
            .map_err(|err| CacheError::Internal(format!("http client: {err}")))?;
        Ok(Self::with_client(peer_url, base_path, client))
    }

    fn with_client(peer_url: &str, base_path: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: format!("{}{}", peer_url.trim_end_matches('/'), base_path),
            client,
        }
    }
}

#[async_trait]
impl PeerGetter for HttpPeer {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| CacheError::Peer(err.to_string()))?;

        if !response.status().is_success() {
            return Err(CacheError::Peer(format!(
                "peer returned {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| CacheError::Peer(err.to_string()))?;
        Ok(body.to_vec())
    }
}
