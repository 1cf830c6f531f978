//! Adapter for a vendor-neutral JSON feed.
//!
//! The feed carries the park metadata and already-normalized records:
//!
//! ```json
//! {
//!   "park": { "name": "MagicKingdom", "timezone": "America/New_York" },
//!   "rides": [ { "id": "123", "name": "Big Drop", "waitTime": 25 } ],
//!   "schedule": [
//!     { "date": "2024-07-04", "openingTime": "2024-07-04T09:00", "closingTime": "2024-07-04T22:00" }
//!   ],
//!   "ranges": [
//!     { "startDate": "2024-07-05", "endDate": "2024-07-31",
//!       "openingTime": "2024-07-05T09:00", "closingTime": "2024-07-05T21:00" }
//!   ]
//! }
//! ```
//!
//! A file-backed feed is re-read on every fetch, so an external scraper can
//! keep rewriting it. Malformed records are logged and skipped.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;
use themeparks_cache::Cache;
use themeparks_core::{
    BoxFuture, Calendar, DateUpdate, GeoLocation, RangeUpdate, Registry, Ride, WAIT_CLOSED,
    WAIT_DOWN, parse_timezone,
};
use tracing::{debug, warn};

use crate::adapter::{ParkAdapter, ParkInfo};
use crate::error::{AdapterError, AdapterResult};

#[derive(Debug, Deserialize)]
struct Feed {
    park: FeedPark,
    #[serde(default)]
    rides: Option<Vec<Value>>,
    #[serde(default)]
    schedule: Option<Vec<Value>>,
    #[serde(default)]
    ranges: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedPark {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    location: Option<GeoLocation>,
    #[serde(default)]
    fast_pass: bool,
    #[serde(default)]
    fast_pass_return_times: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedRide {
    id: String,
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    wait_time: Option<i32>,
    /// `Operating`, `Down`, `Closed` or `Refurbishment`.
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    fast_pass: bool,
    #[serde(default)]
    fast_pass_return: Option<FeedReturnWindow>,
    #[serde(default)]
    location: Option<GeoLocation>,
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    schedule: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedReturnWindow {
    start_time: String,
    end_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedDate {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    opening_time: Option<String>,
    #[serde(default)]
    closing_time: Option<String>,
    #[serde(default = "operating", rename = "type")]
    kind: String,
    #[serde(default)]
    special: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedRange {
    start_date: String,
    end_date: String,
    opening_time: String,
    closing_time: String,
    #[serde(default = "operating", rename = "type")]
    kind: String,
    #[serde(default)]
    special: bool,
}

fn operating() -> String {
    "Operating".to_string()
}

impl From<FeedDate> for DateUpdate {
    fn from(entry: FeedDate) -> Self {
        DateUpdate {
            date: entry.date.map(Into::into),
            opening_time: entry.opening_time.map(Into::into),
            closing_time: entry.closing_time.map(Into::into),
            kind: entry.kind,
            special: entry.special,
        }
    }
}

impl From<FeedRange> for RangeUpdate {
    fn from(range: FeedRange) -> Self {
        let update = RangeUpdate::new(
            range.start_date,
            range.end_date,
            range.opening_time,
            range.closing_time,
        );
        if range.special {
            update.as_special(range.kind)
        } else {
            update.with_kind(range.kind)
        }
    }
}

#[derive(Debug, Clone)]
enum FeedSource {
    File(PathBuf),
    Inline(String),
}

/// Adapter reading a normalized JSON feed.
#[derive(Debug)]
pub struct FeedAdapter {
    info: ParkInfo,
    source: FeedSource,
    wait_times: bool,
    opening_times: bool,
}

impl FeedAdapter {
    /// Opens a feed file. Parks without a timezone use `default_timezone`.
    pub async fn open(path: impl AsRef<Path>, default_timezone: Tz) -> AdapterResult<Self> {
        let path = path.as_ref().to_path_buf();
        let source = FeedSource::File(path);
        let text = read_source(&source).await?;
        Self::build(source, &text, default_timezone)
    }

    /// Creates an adapter over an in-memory feed.
    pub fn from_json(text: impl Into<String>, default_timezone: Tz) -> AdapterResult<Self> {
        let text = text.into();
        Self::build(FeedSource::Inline(text.clone()), &text, default_timezone)
    }

    fn build(source: FeedSource, text: &str, default_timezone: Tz) -> AdapterResult<Self> {
        let feed = parse_feed(text)?;
        let timezone = match feed.park.timezone.as_deref() {
            Some(name) => parse_timezone(name)
                .map_err(|e| AdapterError::configuration(e.to_string()))?,
            None => default_timezone,
        };

        let mut info = ParkInfo::new(feed.park.name, timezone)
            .with_fast_pass(feed.park.fast_pass)
            .with_fast_pass_return_times(feed.park.fast_pass_return_times);
        if let Some(display_name) = feed.park.display_name {
            info = info.with_display_name(display_name);
        }
        if let Some(location) = feed.park.location {
            info = info.with_location(location);
        }
        let wait_times = feed.rides.is_some();
        let opening_times = feed.schedule.is_some() || feed.ranges.is_some();
        info.ride_schedules = feed
            .rides
            .iter()
            .flatten()
            .any(|ride| ride.get("schedule").is_some());

        Ok(Self {
            info,
            source,
            wait_times,
            opening_times,
        })
    }

    async fn load(&self) -> AdapterResult<Feed> {
        let text = read_source(&self.source).await?;
        parse_feed(&text).map_err(|e| e.with_park(&self.info.name))
    }

    fn apply_ride(&self, ride: &mut Ride, record: FeedRide) {
        if let Some(kind) = record.kind {
            ride.set_kind(kind);
        }
        if let Some(location) = record.location {
            ride.set_location(location);
        }
        if let Some(detail) = record.detail {
            ride.set_detail(detail);
        }

        let wait = match record.status.as_deref() {
            None => record.wait_time,
            Some("Operating") => Some(record.wait_time.unwrap_or(0).max(0)),
            Some("Down") => Some(WAIT_DOWN),
            Some("Closed" | "Refurbishment") => Some(WAIT_CLOSED),
            Some(other) => {
                warn!(ride = %ride.id(), status = %other, "Unknown ride status");
                None
            }
        };
        if let Some(minutes) = wait {
            ride.set_wait_time(minutes);
        }

        if self.info.fast_pass {
            ride.set_fast_pass(record.fast_pass);
        }
        if self.info.fast_pass_return_times {
            match record.fast_pass_return.as_ref().and_then(parse_window) {
                Some((start, end)) => {
                    ride.set_fast_pass_window(start, end);
                }
                None => {
                    ride.clear_fast_pass_window();
                }
            }
        }

        for entry in records::<FeedDate>(record.schedule, "ride schedule") {
            ride.schedule_mut().set_date(entry.into());
        }
    }
}

fn parse_window(window: &FeedReturnWindow) -> Option<(NaiveTime, NaiveTime)> {
    let start = NaiveTime::parse_from_str(&window.start_time, "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(&window.end_time, "%H:%M").ok()?;
    Some((start, end))
}

fn parse_feed(text: &str) -> AdapterResult<Feed> {
    serde_json::from_str(text)
        .map_err(|e| AdapterError::invalid_response("malformed feed").with_source(e))
}

async fn read_source(source: &FeedSource) -> AdapterResult<String> {
    match source {
        FeedSource::Inline(text) => Ok(text.clone()),
        FeedSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| read_error(path, e)),
    }
}

fn read_error(path: &Path, e: std::io::Error) -> AdapterError {
    use std::io::ErrorKind;

    let message = format!("cannot read feed {}", path.display());
    let error = match e.kind() {
        ErrorKind::NotFound => AdapterError::not_found(message),
        ErrorKind::TimedOut | ErrorKind::Interrupted | ErrorKind::WouldBlock => {
            AdapterError::network(message)
        }
        _ => AdapterError::internal(message),
    };
    error.with_source(e)
}

/// Deserializes each record on its own so one bad record is skipped rather
/// than failing the whole fetch.
fn records<T: serde::de::DeserializeOwned>(
    values: Option<Vec<Value>>,
    what: &'static str,
) -> impl Iterator<Item = T> {
    values
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(move |(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index = index, error = %e, "Skipping malformed {} record", what);
                None
            }
        })
}

impl ParkAdapter for FeedAdapter {
    fn info(&self) -> &ParkInfo {
        &self.info
    }

    fn supports_wait_times(&self) -> bool {
        self.wait_times
    }

    fn supports_opening_times(&self) -> bool {
        self.opening_times
    }

    fn fetch_wait_times<'a>(
        &'a self,
        _cache: &'a Cache,
        rides: &'a mut Registry,
    ) -> BoxFuture<'a, AdapterResult<()>> {
        Box::pin(async move {
            let feed = self.load().await?;
            let mut updated = 0;
            for record in records::<FeedRide>(feed.rides, "ride") {
                let id = record.id.clone();
                let name = record.name.clone();
                match rides.get_or_create(&id, &name) {
                    Some(ride) => {
                        self.apply_ride(ride, record);
                        updated += 1;
                    }
                    None => debug!(id = %id, "Skipping ride without id or name"),
                }
            }
            debug!(park = %self.info.name, rides = updated, "Applied feed wait times");
            Ok(())
        })
    }

    fn fetch_opening_times<'a>(
        &'a self,
        _cache: &'a Cache,
        schedule: &'a mut Calendar,
    ) -> BoxFuture<'a, AdapterResult<()>> {
        Box::pin(async move {
            let feed = self.load().await?;
            let mut changed = 0;
            for entry in records::<FeedDate>(feed.schedule, "schedule") {
                if schedule.set_date(entry.into()) {
                    changed += 1;
                }
            }
            for range in records::<FeedRange>(feed.ranges, "range") {
                if !schedule.set_range(range.into()) {
                    debug!(park = %self.info.name, "Range was not fully applied");
                }
            }
            debug!(park = %self.info.name, changed = changed, "Applied feed schedule");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterErrorCode;
    use std::io::Write;
    use themeparks_cache::CacheConfig;
    use themeparks_core::{RideStatus, ScheduleType};

    const FEED: &str = r#"{
        "park": {
            "name": "MagicKingdom",
            "displayName": "Magic Kingdom",
            "timezone": "America/New_York",
            "location": { "latitude": 28.3852, "longitude": -81.5639 },
            "fastPass": true,
            "fastPassReturnTimes": true
        },
        "rides": [
            { "id": "1", "name": "Big Drop", "type": "Thrill", "waitTime": 45, "fastPass": true,
              "fastPassReturn": { "startTime": "14:05", "endTime": "15:05" } },
            { "id": "2", "name": "Slow Boat", "status": "Down" },
            { "id": "3", "name": "Haunted Hall", "status": "Refurbishment", "waitTime": 10 },
            { "id": "4", "name": "" },
            { "name": "No Id" },
            { "id": "5", "name": "Teacups", "waitTime": 5,
              "schedule": [ { "date": "2024-07-04", "type": "Closed" }, { "special": "yes" } ] }
        ],
        "schedule": [
            { "date": "2024-07-04", "openingTime": "2024-07-04T09:00", "closingTime": "2024-07-04T22:00" },
            { "date": "2024-07-04", "openingTime": "2024-07-04T07:30", "closingTime": "2024-07-04T09:00",
              "type": "Early Entry", "special": true },
            { "date": "2024-07-06", "type": "Closed" },
            { "date": "not a date", "openingTime": "09:00", "closingTime": "10:00" },
            42
        ],
        "ranges": [
            { "startDate": "2024-07-10", "endDate": "2024-07-12",
              "openingTime": "2024-07-10T10:00", "closingTime": "2024-07-10T01:00" }
        ]
    }"#;

    fn cache() -> Cache {
        Cache::in_memory(CacheConfig::default()).unwrap()
    }

    #[test]
    fn reads_park_metadata() {
        let adapter = FeedAdapter::from_json(FEED, Tz::UTC).unwrap();
        let info = adapter.info();
        assert_eq!(info.name, "MagicKingdom");
        assert_eq!(info.title(), "Magic Kingdom");
        assert_eq!(info.timezone, Tz::America__New_York);
        assert!(info.fast_pass_return_times);
        assert!(info.ride_schedules);
        assert!(adapter.supports_wait_times());
        assert!(adapter.supports_opening_times());
    }

    #[test]
    fn missing_sections_disable_operations() {
        let adapter = FeedAdapter::from_json(r#"{"park": {"name": "Water"}}"#, Tz::Asia__Tokyo)
            .unwrap();
        assert_eq!(adapter.info().timezone, Tz::Asia__Tokyo);
        assert!(!adapter.supports_wait_times());
        assert!(!adapter.supports_opening_times());
    }

    #[test]
    fn rejects_bad_documents() {
        let err = FeedAdapter::from_json("{", Tz::UTC).unwrap_err();
        assert_eq!(err.code(), AdapterErrorCode::InvalidResponse);

        let err = FeedAdapter::from_json(
            r#"{"park": {"name": "X", "timezone": "Mars/Olympus"}}"#,
            Tz::UTC,
        )
        .unwrap_err();
        assert_eq!(err.code(), AdapterErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn wait_times_skip_bad_records() {
        let adapter = FeedAdapter::from_json(FEED, Tz::UTC).unwrap();
        let mut rides = Registry::new("MagicKingdom", Tz::America__New_York).unwrap();
        adapter.fetch_wait_times(&cache(), &mut rides).await.unwrap();

        assert_eq!(rides.len(), 4);

        let big_drop = rides.find("1").unwrap();
        assert_eq!(big_drop.kind(), Some("Thrill"));
        assert_eq!(big_drop.raw_wait_time(), Some(45));
        assert!(big_drop.fast_pass());
        let window = big_drop.fast_pass_window().unwrap();
        assert_eq!(window.start_time, NaiveTime::from_hms_opt(14, 5, 0).unwrap());

        let slow_boat = rides.find("2").unwrap();
        let july_5 = chrono::NaiveDate::from_ymd_opt(2024, 7, 5).unwrap();
        assert_eq!(slow_boat.status_at(july_5), RideStatus::Down);
        assert!(slow_boat.fast_pass_window().is_none());

        assert_eq!(rides.find("3").unwrap().raw_wait_time(), Some(WAIT_CLOSED));

        let teacups = rides.find("5").unwrap();
        let closed_day = chrono::NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        assert_eq!(teacups.status_at(closed_day), RideStatus::Closed);
    }

    #[tokio::test]
    async fn opening_times_skip_bad_records() {
        let adapter = FeedAdapter::from_json(FEED, Tz::UTC).unwrap();
        let mut schedule = Calendar::new(Tz::America__New_York);
        adapter
            .fetch_opening_times(&cache(), &mut schedule)
            .await
            .unwrap();

        let july_4 = schedule.get_date("2024-07-04").unwrap();
        assert_eq!(july_4.kind, ScheduleType::Operating);
        assert_eq!(july_4.special.len(), 1);
        assert_eq!(july_4.special[0].kind, "Early Entry");
        assert_eq!(
            schedule.get_date("2024-07-06").unwrap().kind,
            ScheduleType::Closed
        );

        let ranged = schedule.get_date_range("2024-07-10", "2024-07-12");
        assert_eq!(ranged.len(), 3);
        // open past midnight
        assert!(ranged.iter().all(|day| day.closing_time > day.opening_time));
        assert_eq!(schedule.len(), 5);
    }

    #[tokio::test]
    async fn file_feed_is_reread() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"park": {{"name": "Test"}}, "rides": [{{"id": "1", "name": "A", "waitTime": 5}}]}}"#
        )
        .unwrap();

        let adapter = FeedAdapter::open(file.path(), Tz::UTC).await.unwrap();
        let mut rides = Registry::new("Test", Tz::UTC).unwrap();
        adapter.fetch_wait_times(&cache(), &mut rides).await.unwrap();
        assert_eq!(rides.find("1").unwrap().raw_wait_time(), Some(5));

        std::fs::write(
            file.path(),
            r#"{"park": {"name": "Test"}, "rides": [{"id": "1", "name": "A", "waitTime": 30}]}"#,
        )
        .unwrap();
        adapter.fetch_wait_times(&cache(), &mut rides).await.unwrap();
        assert_eq!(rides.find("1").unwrap().raw_wait_time(), Some(30));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = FeedAdapter::open(dir.path().join("missing.json"), Tz::UTC)
            .await
            .unwrap_err();
        assert_eq!(err.code(), AdapterErrorCode::NotFound);
    }

    #[test]
    fn stalled_reads_are_retryable() {
        use std::io::{Error, ErrorKind};

        let path = Path::new("/mnt/feeds/park.json");
        let err = read_error(path, Error::from(ErrorKind::TimedOut));
        assert_eq!(err.code(), AdapterErrorCode::NetworkError);
        assert!(err.is_retryable());
        assert_eq!(err.message(), "cannot read feed /mnt/feeds/park.json");

        let err = read_error(path, Error::from(ErrorKind::PermissionDenied));
        assert_eq!(err.code(), AdapterErrorCode::InternalError);
        assert!(!err.is_retryable());
    }
}
