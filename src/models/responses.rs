//! Response DTOs for the node HTTP endpoints
//!
//! The peer protocol itself returns raw bytes; these structures cover the
//! operational endpoints and error bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Group name
    pub group: String,
    /// Entries resident in the local tier
    pub entries: usize,
    /// Successful local lookups
    pub hits: u64,
    /// Lookups that went to the load path
    pub misses: u64,
    /// Values loaded from the origin
    pub local_loads: u64,
    /// Origin loader failures
    pub loader_errors: u64,
    /// Values fetched from owning peers
    pub peer_fetches: u64,
    /// Peer fetches recovered by a local load
    pub peer_failures: u64,
    /// Entries evicted by the byte budget
    pub evictions: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a StatsResponse from a group's counters
    pub fn new(group: impl Into<String>, entries: usize, stats: StatsSnapshot) -> Self {
        Self {
            group: group.into(),
            entries,
            hits: stats.hits,
            misses: stats.misses,
            local_loads: stats.local_loads,
            loader_errors: stats.loader_errors,
            peer_fetches: stats.peer_fetches,
            peer_failures: stats.peer_failures,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
