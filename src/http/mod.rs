//! HTTP Module
//!
//! The inter-node protocol surface: peer pool and client on the outbound
//! side, axum router and handlers on the inbound side.
//!
//! # Wire contract
//! `GET {base_path}{group}/{key}` returns the raw value bytes as
//! `application/octet-stream`; path segments are URL-encoded. Errors map
//! to 400 (bad request shape), 404 (unknown group) and 500 (loader
//! failure).

pub mod handlers;
pub mod pool;
pub mod routes;

pub use handlers::AppState;
pub use pool::{HttpPeer, HttpPool, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
pub use routes::create_router;
