//! Fetch coordinator.
//!
//! [`Park`] is what callers talk to. It wraps one [`ParkAdapter`] with the
//! park's ride registry, its calendar and a park-scoped [`Cache`]:
//!
//! ```text
//! get_wait_times()    -> cache "waittimes"    -> hit: restore rides
//!                                             -> miss: adapter -> cache
//! get_opening_times() -> cache "openingtimes" -> hit: restore calendar
//!                                             -> miss: adapter -> fill Closed
//!                                                      -> cache if dirty
//! ```
//!
//! Concurrent callers are not de-duplicated: two callers missing the same
//! key both run the adapter (one after the other, since the registry and
//! calendar are each behind a lock).

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use themeparks_cache::{Cache, Lookup, Ttl};
use themeparks_core::{Calendar, CalendarDay, CalendarSnapshot, Registry, RideSnapshot};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adapter::{ParkAdapter, ParkInfo};
use crate::error::{ParkError, ParkResult};
use crate::settings::Settings;

/// Cache key for ride snapshots.
pub const WAIT_TIMES_KEY: &str = "waittimes";
/// Cache key for the calendar snapshot.
pub const OPENING_TIMES_KEY: &str = "openingtimes";

/// One park: adapter, rides, schedule and cache.
pub struct Park {
    adapter: Arc<dyn ParkAdapter>,
    settings: Settings,
    cache: Cache,
    rides: Mutex<Registry>,
    schedule: Mutex<Calendar>,
}

impl std::fmt::Debug for Park {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Park")
            .field("info", self.adapter.info())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Park {
    /// Creates a park. Fails if the adapter metadata or the settings are
    /// invalid.
    pub fn new(
        adapter: Arc<dyn ParkAdapter>,
        cache: &Cache,
        settings: Settings,
    ) -> ParkResult<Self> {
        settings.validate()?;
        let info = adapter.info();
        info.validate()?;

        let rides = Registry::new(info.name.clone(), info.timezone)?;
        let schedule = Calendar::new(info.timezone);
        let cache = cache.scoped(info.name.clone());
        debug!(park = %info.name, timezone = %info.timezone, "Created park");

        Ok(Self {
            adapter,
            settings,
            cache,
            rides: Mutex::new(rides),
            schedule: Mutex::new(schedule),
        })
    }

    pub fn info(&self) -> &ParkInfo {
        self.adapter.info()
    }

    pub fn name(&self) -> &str {
        &self.adapter.info().name
    }

    pub fn timezone(&self) -> Tz {
        self.adapter.info().timezone
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The park-scoped cache.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Current time in the park.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone())
    }

    /// Today's date in the park.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Returns current wait times for every ride.
    pub async fn get_wait_times(&self) -> ParkResult<Vec<RideSnapshot>> {
        if !self.adapter.supports_wait_times() {
            return Err(self.unsupported("wait times"));
        }

        let lookup = self
            .cache
            .lookup_or_compute(
                WAIT_TIMES_KEY,
                || self.fetch_wait_times(),
                Ttl::secs(self.settings.cache_wait_times_secs),
            )
            .await?;

        match lookup {
            Lookup::Computed(snapshots) => Ok(snapshots),
            Lookup::Hit(snapshots) => {
                let mut rides = self.rides.lock().await;
                let applied = rides.apply_snapshots(snapshots);
                debug!(park = %self.name(), rides = applied, "Restored wait times from cache");
                Ok(rides.snapshots())
            }
        }
    }

    async fn fetch_wait_times(&self) -> ParkResult<Vec<RideSnapshot>> {
        let mut rides = self.rides.lock().await;
        self.adapter
            .fetch_wait_times(&self.cache, &mut *rides)
            .await
            .map_err(|source| {
                warn!(
                    park = %self.name(),
                    code = %source.code(),
                    retryable = source.is_retryable(),
                    "Failed to fetch wait times"
                );
                ParkError::WaitTimes {
                    park: self.name().to_string(),
                    source,
                }
            })?;
        info!(park = %self.name(), rides = rides.len(), "Fetched wait times");
        Ok(rides.snapshots())
    }

    /// Returns opening hours from today through `schedule_days` ahead.
    ///
    /// Days the adapter left empty come back as `Closed`.
    pub async fn get_opening_times(&self) -> ParkResult<Vec<CalendarDay>> {
        if !self.adapter.supports_opening_times() {
            return Err(self.unsupported("opening times"));
        }

        let today = self.today();
        let end = today
            .checked_add_days(Days::new(u64::from(self.settings.schedule_days)))
            .unwrap_or(today);

        if let Some(snapshot) = self
            .cache
            .get::<CalendarSnapshot>(OPENING_TIMES_KEY)
            .await
        {
            let mut schedule = self.schedule.lock().await;
            schedule.restore(snapshot);
            debug!(park = %self.name(), "Restored opening times from cache");
            return Ok(schedule.get_date_range(today, end));
        }

        let mut schedule = self.schedule.lock().await;
        self.adapter
            .fetch_opening_times(&self.cache, &mut *schedule)
            .await
            .map_err(|source| {
                warn!(
                    park = %self.name(),
                    code = %source.code(),
                    retryable = source.is_retryable(),
                    "Failed to fetch opening times"
                );
                ParkError::OpeningTimes {
                    park: self.name().to_string(),
                    source,
                }
            })?;
        schedule.fill_closed(today, self.settings.fill_horizon());
        info!(park = %self.name(), days = schedule.len(), "Fetched opening times");

        let days = schedule.get_date_range(today, end);
        if schedule.is_dirty() {
            match self
                .cache
                .set(
                    OPENING_TIMES_KEY,
                    &schedule.snapshot(),
                    Ttl::secs(self.settings.cache_opening_times_secs),
                )
                .await
            {
                Ok(()) => schedule.mark_clean(),
                Err(e) => warn!(park = %self.name(), error = %e, "Failed to cache opening times"),
            }
        }
        Ok(days)
    }

    /// Looks up one ride from the last fetch or restore.
    pub async fn find_ride(&self, id: &str) -> Option<RideSnapshot> {
        self.rides.lock().await.find(id).map(|ride| ride.snapshot())
    }

    fn unsupported(&self, operation: &'static str) -> ParkError {
        ParkError::Unsupported {
            park: self.name().to_string(),
            operation,
        }
    }
}
