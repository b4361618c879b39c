//! Consistent-Hash Ring Module
//!
//! Maps keys to owning peers through a ring of hashed virtual nodes, so
//! that adding a peer reassigns only the keys falling into its new arcs.

use std::collections::HashMap;

/// Hash function placing peers and keys on the ring.
pub type RingHashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

// == Hash Ring ==
/// Consistent-hash ring over named peers.
///
/// Every peer contributes `replicas` virtual nodes, hashed from the peer
/// name suffixed with the virtual-node index. The ring is a sorted vector
/// of those hashes; a key is owned by the first virtual node clockwise
/// from its own hash, wrapping at the end.
///
/// Not thread-safe on its own; its owner serializes access.
pub struct HashRing {
    hash: RingHashFn,
    replicas: usize,
    /// Virtual-node hashes, sorted ascending
    ring: Vec<u32>,
    /// Virtual-node hash -> peer name
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructors ==
    /// Creates a ring using CRC-32/IEEE as hash function.
    ///
    /// # Panics
    /// Panics if `replicas` is zero.
    pub fn new(replicas: usize) -> Self {
        Self::with_hash(replicas, Box::new(crc32fast::hash))
    }

    /// Creates a ring with a custom hash function.
    ///
    /// # Panics
    /// Panics if `replicas` is zero.
    pub fn with_hash(replicas: usize, hash: RingHashFn) -> Self {
        assert!(replicas > 0, "replicas must be nonzero");
        Self {
            hash,
            replicas,
            ring: Vec::new(),
            owners: HashMap::new(),
        }
    }

    // == Add ==
    /// Adds peers to the ring, each as `replicas` virtual nodes.
    ///
    /// The ring is re-sorted once per call. Duplicate peer names produce
    /// duplicate virtual nodes; callers are expected to deduplicate. When
    /// two virtual nodes collide, the last writer owns the hash.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for peer in peers {
            let peer = peer.into();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{peer}{i}").as_bytes());
                self.ring.push(hash);
                self.owners.insert(hash, peer.clone());
            }
        }
        self.ring.sort_unstable();
    }

    // == Get ==
    /// Returns the peer owning `key`, or `None` for an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.ring.partition_point(|&node| node < hash);
        let vnode = self.ring[idx % self.ring.len()];
        self.owners.get(&vnode).map(String::as_str)
    }

    // == Introspection ==
    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if no peer has been added.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    /// Ring whose hash parses the input as a decimal number, making
    /// placements predictable: peer "6" with 3 replicas lands on 60/61/62.
    fn numeric_ring() -> HashRing {
        HashRing::with_hash(
            3,
            Box::new(|data| {
                std::str::from_utf8(data)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0)
            }),
        )
    }

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new(50);
        assert!(ring.is_empty());
        assert_eq!(ring.get("anything"), None);
    }

    #[test]
    #[should_panic(expected = "replicas must be nonzero")]
    fn test_zero_replicas_panics() {
        let _ = HashRing::new(0);
    }

    #[test]
    fn test_numeric_placement() {
        let mut ring = numeric_ring();
        // Virtual nodes: 20, 21, 22, 40, 41, 42, 60, 61, 62.
        ring.add(["6", "4", "2"]);
        assert_eq!(ring.len(), 9);

        assert_eq!(ring.get("2"), Some("2"));
        assert_eq!(ring.get("11"), Some("2"));
        assert_eq!(ring.get("23"), Some("4"));
        assert_eq!(ring.get("27"), Some("4"));
        assert_eq!(ring.get("50"), Some("6"));
    }

    #[test]
    fn test_wrap_around() {
        let mut ring = numeric_ring();
        ring.add(["6", "4", "2"]);

        // Past the last virtual node the ring wraps to the smallest.
        assert_eq!(ring.get("63"), Some("2"));
        assert_eq!(ring.get("99"), Some("2"));
    }

    #[test]
    fn test_adding_peer_reassigns_only_new_arcs() {
        let mut ring = numeric_ring();
        ring.add(["6", "4", "2"]);

        assert_eq!(ring.get("27"), Some("4"));
        assert_eq!(ring.get("63"), Some("2"));

        // Peer "8" claims 80/81/82; only keys in those arcs move.
        ring.add(["8"]);
        assert_eq!(ring.get("27"), Some("4"));
        assert_eq!(ring.get("63"), Some("8"));
        assert_eq!(ring.get("2"), Some("2"));
    }

    #[test]
    fn test_default_hash_is_deterministic() {
        let peers = ["http://node-a", "http://node-b", "http://node-c"];

        let mut first = HashRing::new(50);
        first.add(peers);
        let mut second = HashRing::new(50);
        second.add(peers);

        for key in ["Tom", "Jack", "Sam", "", "weird key/with/slashes"] {
            let owner = first.get(key);
            assert!(owner.is_some());
            assert_eq!(owner, second.get(key));
            // Stable across repeated calls as well.
            assert_eq!(owner, first.get(key));
        }
    }

    #[test]
    fn test_every_peer_owns_some_keys() {
        let peers = ["http://node-a", "http://node-b", "http://node-c"];
        let mut ring = HashRing::new(50);
        ring.add(peers);

        let mut seen = std::collections::HashSet::new();
        for i in 0..1000 {
            if let Some(owner) = ring.get(&format!("key-{i}")) {
                seen.insert(owner.to_string());
            }
        }
        assert_eq!(seen.len(), peers.len());
    }
}
