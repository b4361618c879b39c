//! hivecache - a distributed in-memory key/value cache
//!
//! Peer nodes share the key space by consistent hashing. A miss on any
//! node is forwarded to the key's owner or computed by a user-supplied
//! loader, with single-flight coalescing protecting the origin from
//! cache stampedes.

pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod http;
pub mod models;
pub mod peers;
pub mod ring;
pub mod singleflight;

pub use cache::{ByteView, StatsSnapshot};
pub use config::Config;
pub use error::CacheError;
pub use group::{get_group, new_group, Getter, GetterFn, Group};
pub use http::{create_router, HttpPeer, HttpPool};
pub use peers::{PeerGetter, PeerPicker};
pub use ring::HashRing;
pub use singleflight::FlightGroup;
