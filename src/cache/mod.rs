//! Cache Module
//!
//! Provides an in-memory typed cache with TTL expiration, lazy and periodic
//! reclamation, and read-through population via `Cache::get_or_set`.

mod entry;
pub mod keys;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{is_expired, CacheEntry};
pub use shared::{Cache, Fetched};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Largest accepted TTL (one year)
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;
