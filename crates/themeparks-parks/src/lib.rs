//! Park adapters and the fetch coordinator.
//!
//! This crate ties vendor data sources to the core types and the cache:
//!
//! - [`ParkAdapter`] - The trait every vendor integration implements
//! - [`Park`] - Wraps an adapter with cache-aside wait times and opening times
//! - [`FeedAdapter`] - Adapter for a vendor-neutral JSON feed
//! - [`Settings`] - TTLs, schedule horizon and default timezone
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────────┐   ┌──────────────┐
//!   │ FeedAdapter  │   │ other vendor │
//!   └──────┬───────┘   └──────┬───────┘
//!          │     ParkAdapter     │
//!          └──────────┬──────────┘
//!                     ▼
//!              ┌─────────────┐       ┌────────────┐
//!              │    Park     │◀─────▶│   Cache    │
//!              └──────┬──────┘       └────────────┘
//!                     │
//!          ┌──────────┴──────────┐
//!          ▼                     ▼
//!   ┌─────────────┐       ┌─────────────┐
//!   │  Registry   │       │  Calendar   │
//!   └─────────────┘       └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use themeparks_cache::Cache;
//! use themeparks_parks::{FeedAdapter, Park, Settings};
//!
//! let settings = Settings::default();
//! let cache = Cache::in_memory(settings.cache_config())?;
//! let adapter = FeedAdapter::open("park.json", settings.timezone()?).await?;
//! let park = Park::new(Arc::new(adapter), &cache, settings)?;
//! for ride in park.get_wait_times().await? {
//!     println!("{}: {}", ride.name, ride.wait_time);
//! }
//! ```

pub mod adapter;
pub mod error;
pub mod feed;
pub mod park;
pub mod settings;

pub use adapter::{ErrorAdapter, ParkAdapter, ParkInfo};
pub use error::{AdapterError, AdapterErrorCode, AdapterResult, ParkError, ParkResult};
pub use feed::FeedAdapter;
pub use park::{OPENING_TIMES_KEY, Park, WAIT_TIMES_KEY};
pub use settings::Settings;
