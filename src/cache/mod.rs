//! Cache Module
//!
//! Byte-accounted LRU storage and the immutable value type.

mod byte_view;
mod locked;
mod lru;
mod stats;


// Re-export public types
pub use byte_view::ByteView;
pub use locked::LockedCache;
pub use lru::{EvictionCallback, LruStore};
pub use stats::{GroupStats, StatsSnapshot};
