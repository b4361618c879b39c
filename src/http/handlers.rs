//! HTTP Handlers
//!
//! Request handlers for the inter-node protocol and the operational
//! endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::group::get_group;
use crate::http::pool::HttpPool;
use crate::models::{HealthResponse, StatsResponse};

/// Shared state for the node's HTTP surface.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<HttpPool>,
}

/// Handler for `GET {base_path}:group/:key`
///
/// Resolves the group from the registry and serves the raw value bytes.
/// This is the endpoint other nodes call when this node owns a key.
pub async fn peer_get_handler(
    State(state): State<AppState>,
    Path((group_name, key)): Path<(String, String)>,
) -> Result<Response> {
    debug!(node = state.pool.self_url(), group = %group_name, key = %key, "peer request");

    let group =
        get_group(&group_name).ok_or_else(|| CacheError::UnknownGroup(group_name.clone()))?;
    let view = group.get(&key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.byte_slice(),
    )
        .into_response())
}

/// Handler for any other path shape under the protocol base path.
pub async fn bad_path_handler() -> CacheError {
    CacheError::InvalidRequest("expected <group>/<key> under the cache base path".to_string())
}

/// Handler for `GET /stats/:group`
pub async fn stats_handler(Path(group_name): Path<String>) -> Result<Json<StatsResponse>> {
    let group =
        get_group(&group_name).ok_or_else(|| CacheError::UnknownGroup(group_name.clone()))?;
    Ok(Json(StatsResponse::new(
        group.name(),
        group.cache_len(),
        group.stats(),
    )))
}

/// Handler for `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
