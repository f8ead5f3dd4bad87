//! Cache Module
//!
//! Provides in-memory response caching with lazy TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Default TTL for cached responses, in seconds
pub const DEFAULT_TTL_SECONDS: u64 = 3600;
