//! Runtime settings shared by the cache and every park.
//!
//! Built once at startup (usually from the CLI config file) and passed
//! explicitly to [`crate::Park::new`].

use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use themeparks_cache::CacheConfig;
use themeparks_core::parse_timezone;

use crate::error::{ParkError, ParkResult};

/// Longest TTL accepted for any cache entry (one year).
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Settings for fetching and caching park data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds to cache wait times.
    pub cache_wait_times_secs: u64,
    /// Seconds to cache opening times.
    pub cache_opening_times_secs: u64,
    /// Fallback TTL for cache calls that do not pick one.
    pub default_cache_ttl_secs: u64,
    /// Entry limit of the in-memory cache.
    pub cache_max_entries: usize,
    /// Days of opening times returned, counted from today.
    pub schedule_days: u32,
    /// Extra days past `schedule_days` filled in as `Closed` when missing.
    pub closed_fill_days: u32,
    /// Timezone assumed for parks that do not declare one.
    pub default_timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_wait_times_secs: 300,
            cache_opening_times_secs: 3600,
            default_cache_ttl_secs: 3600,
            cache_max_entries: 5000,
            schedule_days: 30,
            closed_fill_days: 90,
            default_timezone: "Europe/London".to_string(),
        }
    }
}

impl Settings {
    pub fn with_cache_wait_times_secs(mut self, secs: u64) -> Self {
        self.cache_wait_times_secs = secs;
        self
    }

    pub fn with_cache_opening_times_secs(mut self, secs: u64) -> Self {
        self.cache_opening_times_secs = secs;
        self
    }

    pub fn with_schedule_days(mut self, days: u32) -> Self {
        self.schedule_days = days;
        self
    }

    pub fn with_closed_fill_days(mut self, days: u32) -> Self {
        self.closed_fill_days = days;
        self
    }

    pub fn with_default_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.default_timezone = timezone.into();
        self
    }

    /// Parsed [`Settings::default_timezone`].
    pub fn timezone(&self) -> ParkResult<Tz> {
        Ok(parse_timezone(&self.default_timezone)?)
    }

    /// Cache configuration derived from these settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_default_ttl(Duration::from_secs(self.default_cache_ttl_secs))
            .with_max_entries(self.cache_max_entries)
    }

    /// Days that get filled in as `Closed` after a fetch.
    pub fn fill_horizon(&self) -> u32 {
        self.schedule_days.saturating_add(self.closed_fill_days)
    }

    /// Checks the values are usable.
    pub fn validate(&self) -> ParkResult<()> {
        if self.cache_wait_times_secs == 0 || self.cache_opening_times_secs == 0 {
            return Err(ParkError::config("cache TTLs must be greater than zero"));
        }
        if self.default_cache_ttl_secs == 0 {
            return Err(ParkError::config("default cache TTL must be greater than zero"));
        }
        let longest = self
            .cache_wait_times_secs
            .max(self.cache_opening_times_secs)
            .max(self.default_cache_ttl_secs);
        if longest > MAX_CACHE_TTL_SECS {
            return Err(ParkError::config(format!(
                "cache TTLs must not exceed {} seconds",
                MAX_CACHE_TTL_SECS
            )));
        }
        if self.cache_max_entries == 0 {
            return Err(ParkError::config("cache_max_entries must be greater than zero"));
        }
        self.timezone()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cache_wait_times_secs, 300);
        assert_eq!(settings.cache_opening_times_secs, 3600);
        assert_eq!(settings.schedule_days, 30);
        assert_eq!(settings.fill_horizon(), 120);
        assert_eq!(settings.timezone().unwrap(), Tz::Europe__London);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_deserialization_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"schedule_days": 7, "default_timezone": "Asia/Tokyo"}"#)
                .unwrap();
        assert_eq!(settings.schedule_days, 7);
        assert_eq!(settings.timezone().unwrap(), Tz::Asia__Tokyo);
        assert_eq!(settings.cache_wait_times_secs, 300);
    }

    #[test]
    fn cache_config_follows_settings() {
        let settings = Settings {
            default_cache_ttl_secs: 60,
            cache_max_entries: 10,
            ..Default::default()
        };
        let config = settings.cache_config();
        assert_eq!(config.default_ttl, Duration::from_secs(60));
        assert_eq!(config.max_entries, 10);
        assert_eq!(config.namespace, "themeparks");
    }

    #[test]
    fn validation() {
        assert!(
            Settings::default()
                .with_cache_wait_times_secs(0)
                .validate()
                .is_err()
        );
        assert!(matches!(
            Settings::default()
                .with_cache_wait_times_secs(u64::MAX)
                .validate(),
            Err(ParkError::Config { .. })
        ));
        assert!(
            Settings::default()
                .with_cache_opening_times_secs(MAX_CACHE_TTL_SECS)
                .validate()
                .is_ok()
        );
        assert!(matches!(
            Settings::default()
                .with_default_timezone("Mars/Olympus")
                .validate(),
            Err(ParkError::Core(_))
        ));
    }
}
