//! Response models for the node HTTP surface
//!
//! DTOs serialized into the operational endpoints and error bodies. The
//! peer protocol has no request bodies; it is addressed entirely through
//! the URL path.

pub mod responses;

pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
