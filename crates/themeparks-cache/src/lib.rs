//! Cache-aside orchestration for park data.
//!
//! This crate provides:
//! - [`CacheStore`], the key/value collaborator contract, and
//!   [`MemoryStore`], an in-process LRU implementation with per-entry TTL
//! - [`Cache`], the get-or-compute orchestrator with global and per-park
//!   key scopes
//!
//! # Example
//!
//! ```rust,no_run
//! use themeparks_cache::{Cache, CacheConfig, Ttl};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Cache::in_memory(CacheConfig::default())?.scoped("MagicKingdom");
//! let rides: Vec<String> = cache
//!     .get_or_compute("rides", || async { Ok::<_, std::io::Error>(vec![]) }, Ttl::secs(300))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod error;
mod store;

pub use cache::{Cache, Lookup, Ttl};
pub use config::{CacheConfig, DEFAULT_NAMESPACE};
pub use error::{CacheError, CacheResult};
pub use store::{CacheStore, MemoryStore};
