//! Lindy Cache - typed in-process TTL cache
//!
//! Shields a data store from repeated expensive queries with a read-through
//! `get_or_set`, lazy and periodic expiry, and a small admin HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, Fetched};
pub use config::{CacheConfig, Config};
pub use error::CacheError;
pub use tasks::spawn_sweep_task;
