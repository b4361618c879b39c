//! Group Statistics Module
//!
//! Tracks per-group cache performance counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Snapshot ==
/// Point-in-time copy of a group's counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    /// Successful local cache lookups
    pub hits: u64,
    /// Local cache lookups that fell through to the load path
    pub misses: u64,
    /// Values loaded from the origin and admitted locally
    pub local_loads: u64,
    /// Origin loader failures
    pub loader_errors: u64,
    /// Values fetched from the owning peer
    pub peer_fetches: u64,
    /// Failed peer fetches, recovered by loading locally
    pub peer_failures: u64,
    /// Entries evicted by the byte budget
    pub evictions: u64,
}

impl StatsSnapshot {
    /// Returns hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Group Stats ==
/// Cache performance counters, shared by every caller of a group.
///
/// Counters are relaxed atomics: they order nothing and are read only
/// through [`GroupStats::snapshot`].
#[derive(Debug, Default)]
pub struct GroupStats {
    hits: AtomicU64,
    misses: AtomicU64,
    local_loads: AtomicU64,
    loader_errors: AtomicU64,
    peer_fetches: AtomicU64,
    peer_failures: AtomicU64,
    evictions: AtomicU64,
}

impl GroupStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loader_error(&self) {
        self.loader_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_fetch(&self) {
        self.peer_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_failure(&self) {
        self.peer_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies all counters into a serializable snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            loader_errors: self.loader_errors.load(Ordering::Relaxed),
            peer_fetches: self.peer_fetches.load(Ordering::Relaxed),
            peer_failures: self.peer_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let snapshot = GroupStats::default().snapshot();
        assert_eq!(snapshot.hits, 0);
        assert_eq!(snapshot.misses, 0);
        assert_eq!(snapshot.local_loads, 0);
        assert_eq!(snapshot.evictions, 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let stats = GroupStats::default();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_local_load();
        stats.record_peer_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.local_loads, 1);
        assert_eq!(snapshot.peer_failures, 1);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(StatsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = GroupStats::default();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.snapshot().hit_rate(), 0.5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_string(&GroupStats::default().snapshot()).unwrap();
        assert!(json.contains("hits"));
        assert!(json.contains("peer_fetches"));
    }
}
