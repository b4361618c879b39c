//! Peer Capability Module
//!
//! Capability traits connecting a group to the nodes owning other slices
//! of the key space.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Picks the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the client for the key's owner, or `None` when the key is
    /// owned locally (or no peers are configured).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches a value from one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Requests `key` from the peer's `group` and returns the value bytes.
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}
