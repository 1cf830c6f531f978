//! Ride state: wait time, fastpass and derived status.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::calendar::{Calendar, CalendarDay, DateUpdate, ScheduleType};
use crate::error::{CoreError, CoreResult};
use crate::geo::GeoLocation;

/// Wait time reported for a ride that is closed for the day.
pub const WAIT_CLOSED: i32 = -1;
/// Wait time reported for a ride that is temporarily down.
pub const WAIT_DOWN: i32 = -2;

/// Derived status of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RideStatus {
    /// Open with a current wait time.
    Operating,
    /// Temporarily broken down.
    Down,
    /// Closed for the day (or no data yet).
    Closed,
    /// Closed for planned maintenance.
    Refurbishment,
}

impl RideStatus {
    /// Returns the display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operating => "Operating",
            Self::Down => "Down",
            Self::Closed => "Closed",
            Self::Refurbishment => "Refurbishment",
        }
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fastpass return window in park-local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastPassWindow {
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
}

/// Serialized fastpass return window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastPassReturnTime {
    #[serde(flatten)]
    pub window: FastPassWindow,
    pub last_update: Option<DateTime<Utc>>,
}

/// Serialized form of a [`Ride`], as cached and as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideSnapshot {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    pub active: bool,
    pub wait_time: i32,
    pub fast_pass: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub status: RideStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_pass_return_time: Option<FastPassReturnTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<CalendarDay>,
}

/// One attraction tracked by a park.
///
/// Setters only stamp `last_update` when the stored value actually changes,
/// so polling the same data repeatedly keeps the original timestamp.
#[derive(Debug, Clone)]
pub struct Ride {
    id: String,
    name: String,
    kind: Option<String>,
    location: Option<GeoLocation>,
    detail: Option<serde_json::Value>,
    wait_time: Option<i32>,
    fast_pass: bool,
    fast_pass_window: Option<FastPassWindow>,
    last_update: Option<DateTime<Utc>>,
    fast_pass_update: Option<DateTime<Utc>>,
    schedule: Calendar,
}

impl Ride {
    /// Creates a ride with no wait time. Its schedule uses `timezone`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, timezone: Tz) -> CoreResult<Self> {
        let id = id.into();
        let name = name.into();
        if id.is_empty() {
            return Err(CoreError::missing("id"));
        }
        if name.is_empty() {
            return Err(CoreError::missing("name"));
        }
        Ok(Self {
            id,
            name,
            kind: None,
            location: None,
            detail: None,
            wait_time: None,
            fast_pass: false,
            fast_pass_window: None,
            last_update: None,
            fast_pass_update: None,
            schedule: Calendar::new(timezone),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form ride type, e.g. "Thrill" or "Show".
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn set_kind(&mut self, kind: impl Into<String>) {
        self.kind = Some(kind.into());
    }

    pub fn location(&self) -> Option<GeoLocation> {
        self.location
    }

    pub fn set_location(&mut self, location: GeoLocation) {
        self.location = Some(location);
    }

    /// Vendor-specific extra data, passed through untouched.
    pub fn detail(&self) -> Option<&serde_json::Value> {
        self.detail.as_ref()
    }

    pub fn set_detail(&mut self, detail: serde_json::Value) {
        self.detail = Some(detail);
    }

    /// Current wait in minutes, never negative.
    pub fn wait_time(&self) -> i32 {
        self.wait_time.unwrap_or(WAIT_CLOSED).max(0)
    }

    /// Raw wait value including the [`WAIT_CLOSED`] and [`WAIT_DOWN`]
    /// sentinels; `None` until the first update.
    pub fn raw_wait_time(&self) -> Option<i32> {
        self.wait_time
    }

    /// Sets the wait time. Returns true if it changed.
    pub fn set_wait_time(&mut self, minutes: i32) -> bool {
        if self.wait_time == Some(minutes) {
            return false;
        }
        trace!(ride = %self.id, from = ?self.wait_time, to = minutes, "Wait time changed");
        self.wait_time = Some(minutes);
        self.last_update = Some(Utc::now());
        true
    }

    pub fn fast_pass(&self) -> bool {
        self.fast_pass
    }

    /// Sets fastpass availability. Returns true if it changed.
    pub fn set_fast_pass(&mut self, available: bool) -> bool {
        if self.fast_pass == available {
            return false;
        }
        self.fast_pass = available;
        self.last_update = Some(Utc::now());
        true
    }

    /// Returns the current return window, if any.
    pub fn fast_pass_window(&self) -> Option<FastPassWindow> {
        self.fast_pass_window
    }

    /// Time the return window last changed.
    pub fn fast_pass_last_update(&self) -> Option<DateTime<Utc>> {
        self.fast_pass_update
    }

    /// Publishes a return window; also marks fastpass as available.
    pub fn set_fast_pass_window(&mut self, start_time: NaiveTime, end_time: NaiveTime) -> bool {
        let window = FastPassWindow {
            start_time,
            end_time,
        };
        let changed = self.fast_pass_window != Some(window);
        if changed {
            self.fast_pass_window = Some(window);
            self.fast_pass_update = Some(Utc::now());
        }
        self.set_fast_pass(true) || changed
    }

    /// Marks return times as unavailable.
    pub fn clear_fast_pass_window(&mut self) -> bool {
        if self.fast_pass_window.take().is_none() {
            return false;
        }
        self.fast_pass_update = Some(Utc::now());
        true
    }

    /// Time any tracked field last changed.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Ride-specific opening hours.
    pub fn schedule(&self) -> &Calendar {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut Calendar {
        &mut self.schedule
    }

    /// Status for the given civil date.
    ///
    /// A planned closure in the schedule wins over the live wait time.
    pub fn status_at(&self, date: NaiveDate) -> RideStatus {
        match self.schedule.get_date(date).map(|day| day.kind) {
            Some(ScheduleType::Closed) => RideStatus::Closed,
            Some(ScheduleType::Refurbishment) => RideStatus::Refurbishment,
            Some(ScheduleType::Operating) | None => match self.wait_time {
                Some(WAIT_DOWN) => RideStatus::Down,
                Some(minutes) if minutes >= 0 => RideStatus::Operating,
                _ => RideStatus::Closed,
            },
        }
    }

    /// Status for today in the ride's timezone.
    pub fn status(&self) -> RideStatus {
        self.status_at(self.schedule.today())
    }

    /// True when the ride is operating right now.
    pub fn active(&self) -> bool {
        self.status() == RideStatus::Operating
    }

    /// Builds the serializable form for today.
    pub fn snapshot(&self) -> RideSnapshot {
        let today = self.schedule.today();
        let status = self.status_at(today);
        RideSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
            location: self.location,
            detail: self.detail.clone(),
            active: status == RideStatus::Operating,
            wait_time: self.wait_time(),
            fast_pass: self.fast_pass,
            last_update: self.last_update,
            status,
            fast_pass_return_time: self.fast_pass_window.map(|window| FastPassReturnTime {
                window,
                last_update: self.fast_pass_update,
            }),
            schedule: self.schedule.get_date(today),
        }
    }

    /// Restores state from a cached snapshot.
    ///
    /// The name is left alone. An inactive snapshot restores as closed
    /// ([`WAIT_CLOSED`]) whatever wait time it carried.
    pub fn apply_snapshot(&mut self, snapshot: RideSnapshot) {
        if snapshot.kind.is_some() {
            self.kind = snapshot.kind;
        }
        if snapshot.location.is_some() {
            self.location = snapshot.location;
        }
        if snapshot.detail.is_some() {
            self.detail = snapshot.detail;
        }

        self.wait_time = Some(if snapshot.active {
            snapshot.wait_time
        } else {
            WAIT_CLOSED
        });
        self.fast_pass = snapshot.fast_pass;
        self.last_update = snapshot.last_update;

        match snapshot.fast_pass_return_time {
            Some(return_time) => {
                self.fast_pass_window = Some(return_time.window);
                self.fast_pass_update = return_time.last_update;
            }
            None => self.fast_pass_window = None,
        }

        if let Some(day) = snapshot.schedule {
            self.import_day(day);
        }
        debug!(ride = %self.id, "Restored ride from snapshot");
    }

    fn import_day(&mut self, day: CalendarDay) {
        self.schedule.set_date(
            DateUpdate::new(day.date)
                .with_hours(day.opening_time, day.closing_time)
                .with_kind(day.kind.as_str()),
        );
        for special in day.special {
            self.schedule.set_date(
                DateUpdate::new(day.date)
                    .with_hours(special.opening_time, special.closing_time)
                    .as_special(special.kind),
            );
        }
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}
