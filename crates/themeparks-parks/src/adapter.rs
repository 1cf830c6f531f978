//! ParkAdapter trait definition.
//!
//! A [`ParkAdapter`] is the vendor-specific half of a park: it knows how to
//! talk to one data source and pushes what it finds into the core types.
//! The [`crate::Park`] coordinator owns the caching around it.
//!
//! Adapters are expected to:
//! - register rides with [`Registry::get_or_create`] and update them through
//!   the ride setters in `fetch_wait_times`
//! - write hours with [`Calendar::set_date`] / [`Calendar::set_range`] in
//!   `fetch_opening_times`
//! - log and skip malformed individual records instead of failing the fetch
//!
//! ```ignore
//! struct VendorAdapter {
//!     info: ParkInfo,
//!     client: VendorClient,
//! }
//!
//! impl ParkAdapter for VendorAdapter {
//!     fn info(&self) -> &ParkInfo { &self.info }
//!
//!     fn fetch_wait_times<'a>(
//!         &'a self,
//!         cache: &'a Cache,
//!         rides: &'a mut Registry,
//!     ) -> BoxFuture<'a, AdapterResult<()>> {
//!         Box::pin(async move {
//!             for record in self.client.wait_times().await? {
//!                 if let Some(ride) = rides.get_or_create(&record.id, &record.name) {
//!                     ride.set_wait_time(record.minutes);
//!                 }
//!             }
//!             Ok(())
//!         })
//!     }
//! }
//! ```

use chrono_tz::Tz;
use themeparks_cache::Cache;
use themeparks_core::{BoxFuture, Calendar, CoreError, CoreResult, GeoLocation, Registry};

use crate::error::{AdapterError, AdapterResult};

/// Static metadata about a park.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkInfo {
    /// Unique park name; also the namespace for ride ids and cache keys.
    pub name: String,
    /// Human-readable name, if different from `name`.
    pub display_name: Option<String>,
    /// Timezone of the park's opening hours.
    pub timezone: Tz,
    pub location: Option<GeoLocation>,
    /// Whether the park offers fastpass.
    pub fast_pass: bool,
    /// Whether fastpass return windows are published.
    pub fast_pass_return_times: bool,
    /// Whether rides carry their own opening hours.
    pub ride_schedules: bool,
}

impl ParkInfo {
    pub fn new(name: impl Into<String>, timezone: Tz) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            timezone,
            location: None,
            fast_pass: false,
            fast_pass_return_times: false,
            ride_schedules: false,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_fast_pass(mut self, fast_pass: bool) -> Self {
        self.fast_pass = fast_pass;
        self
    }

    /// Builder: publishes return windows (implies fastpass).
    pub fn with_fast_pass_return_times(mut self, return_times: bool) -> Self {
        self.fast_pass_return_times = return_times;
        self.fast_pass |= return_times;
        self
    }

    pub fn with_ride_schedules(mut self, ride_schedules: bool) -> Self {
        self.ride_schedules = ride_schedules;
        self
    }

    /// Display name, falling back to `name`.
    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Checks the metadata is usable.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::missing("name"));
        }
        Ok(())
    }
}

/// Vendor-specific data source for one park.
///
/// Both fetch methods receive the park-scoped [`Cache`] so adapters can
/// memoize auxiliary data such as auth tokens.
pub trait ParkAdapter: Send + Sync {
    /// Returns the park's static metadata.
    fn info(&self) -> &ParkInfo;

    /// Whether [`ParkAdapter::fetch_wait_times`] is implemented.
    fn supports_wait_times(&self) -> bool {
        true
    }

    /// Whether [`ParkAdapter::fetch_opening_times`] is implemented.
    fn supports_opening_times(&self) -> bool {
        true
    }

    /// Fetches current wait times into `rides`.
    fn fetch_wait_times<'a>(
        &'a self,
        _cache: &'a Cache,
        _rides: &'a mut Registry,
    ) -> BoxFuture<'a, AdapterResult<()>> {
        Box::pin(async { Err(AdapterError::unsupported("wait times")) })
    }

    /// Fetches opening hours into `schedule`.
    fn fetch_opening_times<'a>(
        &'a self,
        _cache: &'a Cache,
        _schedule: &'a mut Calendar,
    ) -> BoxFuture<'a, AdapterResult<()>> {
        Box::pin(async { Err(AdapterError::unsupported("opening times")) })
    }
}

/// An adapter whose fetches always fail.
///
/// Useful in tests, or as a stand-in for a park whose adapter could not be
/// configured.
#[derive(Debug)]
pub struct ErrorAdapter {
    info: ParkInfo,
    error: AdapterError,
}

impl ErrorAdapter {
    pub fn new(info: ParkInfo, error: AdapterError) -> Self {
        Self { info, error }
    }

    fn error(&self) -> AdapterError {
        AdapterError::new(self.error.code(), self.error.message()).with_park(&self.info.name)
    }
}

impl ParkAdapter for ErrorAdapter {
    fn info(&self) -> &ParkInfo {
        &self.info
    }

    fn fetch_wait_times<'a>(
        &'a self,
        _cache: &'a Cache,
        _rides: &'a mut Registry,
    ) -> BoxFuture<'a, AdapterResult<()>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn fetch_opening_times<'a>(
        &'a self,
        _cache: &'a Cache,
        _schedule: &'a mut Calendar,
    ) -> BoxFuture<'a, AdapterResult<()>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}
