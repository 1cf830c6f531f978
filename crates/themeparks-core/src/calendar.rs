//! Calendar engine for opening hours.
//!
//! A [`Calendar`] stores at most one [`CalendarDay`] per civil day (the
//! primary store) plus any number of [`SpecialCalendarEntry`] overlays per
//! day (extra magic hours, holiday events, ...). Days are keyed by their
//! day index (see [`crate::time::day_index`]).
//!
//! Writes go through [`Calendar::set_date`] and [`Calendar::set_range`].
//! Malformed input is logged and dropped (the call returns `false`), and
//! re-writing identical data is a no-op that leaves the dirty flag alone, so
//! a refetch that changes nothing does not trigger a cache write.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::time::{TimeInput, date_index, day_index, index_date, today_in};

/// Label of the primary "open" type.
pub const OPERATING: &str = "Operating";
/// Label of the primary "closed" type.
pub const CLOSED: &str = "Closed";
/// Label of the primary "refurbishment" type.
pub const REFURBISHMENT: &str = "Refurbishment";

/// The type of a primary schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleType {
    /// Open to the public.
    Operating,
    /// Closed for the day.
    Closed,
    /// Closed for planned maintenance.
    Refurbishment,
}

impl ScheduleType {
    /// Parses a primary schedule label. Labels are case-sensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            OPERATING => Some(Self::Operating),
            CLOSED => Some(Self::Closed),
            REFURBISHMENT => Some(Self::Refurbishment),
            _ => None,
        }
    }

    /// Returns the label of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operating => OPERATING,
            Self::Closed => CLOSED,
            Self::Refurbishment => REFURBISHMENT,
        }
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A special-hours overlay for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialCalendarEntry {
    /// Opening time of the special session.
    pub opening_time: DateTime<FixedOffset>,
    /// Closing time of the special session.
    pub closing_time: DateTime<FixedOffset>,
    /// Free-form label, e.g. "Extra Magic Hours".
    #[serde(rename = "type")]
    pub kind: String,
}

impl SpecialCalendarEntry {
    fn identical(&self, other: &Self) -> bool {
        self.kind == other.kind
            && same_instant(&self.opening_time, &other.opening_time)
            && same_instant(&self.closing_time, &other.closing_time)
    }
}

/// Opening hours for one civil day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    /// The civil date.
    pub date: NaiveDate,
    /// Opening time on `date`.
    pub opening_time: DateTime<FixedOffset>,
    /// Closing time; on `date + 1` when open past midnight.
    pub closing_time: DateTime<FixedOffset>,
    /// Primary schedule type.
    #[serde(rename = "type")]
    pub kind: ScheduleType,
    /// Special hours attached to this day (only populated on reads).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special: Vec<SpecialCalendarEntry>,
}

impl CalendarDay {
    /// Returns the day index of this entry.
    pub fn day(&self) -> i64 {
        date_index(self.date)
    }

    /// Returns true if the primary type is [`ScheduleType::Operating`].
    pub fn is_operating(&self) -> bool {
        self.kind == ScheduleType::Operating
    }

    fn identical(&self, other: &Self) -> bool {
        self.date == other.date
            && self.kind == other.kind
            && same_instant(&self.opening_time, &other.opening_time)
            && same_instant(&self.closing_time, &other.closing_time)
    }
}

/// Instants compare equal only if their offsets match too, so re-publishing
/// the same hours in a different offset counts as a change.
fn same_instant(a: &DateTime<FixedOffset>, b: &DateTime<FixedOffset>) -> bool {
    a == b && a.offset() == b.offset()
}

/// Input for [`Calendar::set_date`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateUpdate {
    /// Day to set; falls back to `opening_time` when absent.
    pub date: Option<TimeInput>,
    /// Opening time; may be omitted for `Closed` entries.
    pub opening_time: Option<TimeInput>,
    /// Closing time; may be omitted for `Closed` entries.
    pub closing_time: Option<TimeInput>,
    /// `Operating`, `Closed` or `Refurbishment` for primary entries; any
    /// other non-empty label for special entries.
    pub kind: String,
    /// Whether this is a special-hours overlay.
    pub special: bool,
}

impl Default for DateUpdate {
    fn default() -> Self {
        Self {
            date: None,
            opening_time: None,
            closing_time: None,
            kind: OPERATING.to_string(),
            special: false,
        }
    }
}

impl DateUpdate {
    /// Creates an update for the given day.
    pub fn new(date: impl Into<TimeInput>) -> Self {
        Self {
            date: Some(date.into()),
            ..Default::default()
        }
    }

    /// Creates an `Operating` update whose day is taken from `opening_time`.
    pub fn hours(opening_time: impl Into<TimeInput>, closing_time: impl Into<TimeInput>) -> Self {
        Self {
            opening_time: Some(opening_time.into()),
            closing_time: Some(closing_time.into()),
            ..Default::default()
        }
    }

    /// Creates a full-day `Closed` update.
    pub fn closed(date: impl Into<TimeInput>) -> Self {
        Self::new(date).with_kind(CLOSED)
    }

    /// Builder: set the day.
    pub fn with_date(mut self, date: impl Into<TimeInput>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Builder: set opening and closing times.
    pub fn with_hours(
        mut self,
        opening_time: impl Into<TimeInput>,
        closing_time: impl Into<TimeInput>,
    ) -> Self {
        self.opening_time = Some(opening_time.into());
        self.closing_time = Some(closing_time.into());
        self
    }

    /// Builder: set the schedule type label.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Builder: mark as a special-hours overlay with the given label.
    pub fn as_special(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self.special = true;
        self
    }
}

/// Input for [`Calendar::set_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeUpdate {
    /// First day of the range (inclusive).
    pub start_date: TimeInput,
    /// Last day of the range (inclusive).
    pub end_date: TimeInput,
    /// Opening time, re-anchored onto every day.
    pub opening_time: TimeInput,
    /// Closing time, re-anchored onto every day.
    pub closing_time: TimeInput,
    /// Schedule type label, as for [`DateUpdate::kind`].
    pub kind: String,
    /// Whether these are special-hours overlays.
    pub special: bool,
}

impl RangeUpdate {
    /// Creates an `Operating` range update.
    pub fn new(
        start_date: impl Into<TimeInput>,
        end_date: impl Into<TimeInput>,
        opening_time: impl Into<TimeInput>,
        closing_time: impl Into<TimeInput>,
    ) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            opening_time: opening_time.into(),
            closing_time: closing_time.into(),
            kind: OPERATING.to_string(),
            special: false,
        }
    }

    /// Builder: set the schedule type label.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Builder: mark as special-hours overlays with the given label.
    pub fn as_special(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self.special = true;
        self
    }
}

/// Serialized form of a [`Calendar`], as stored in the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSnapshot {
    /// Primary entries keyed by day index.
    pub dates: BTreeMap<i64, CalendarDay>,
    /// Special entries keyed by day index.
    pub dates_special: BTreeMap<i64, Vec<SpecialCalendarEntry>>,
}

/// Opening hours store for one park or ride.
#[derive(Debug, Clone)]
pub struct Calendar {
    timezone: Tz,
    days: BTreeMap<i64, CalendarDay>,
    special: BTreeMap<i64, Vec<SpecialCalendarEntry>>,
    dirty: bool,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl Calendar {
    /// Creates an empty calendar. Zone-less inputs are read in `timezone`.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            days: BTreeMap::new(),
            special: BTreeMap::new(),
            // empty data is never worth caching
            dirty: false,
        }
    }

    /// Returns the calendar's timezone.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Returns today's civil date in the calendar's timezone.
    pub fn today(&self) -> NaiveDate {
        today_in(&self.timezone)
    }

    /// Returns true if the calendar changed since the last successful write-back.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag after a successful write-back.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Number of days with primary data.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true if no primary data is stored.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Sets schedule data for one day.
    ///
    /// Returns `true` only if the stored data actually changed. Returns
    /// `false` without mutating anything when a time fails to parse, the type
    /// is not valid for the target store, or the data is already present.
    pub fn set_date(&mut self, update: DateUpdate) -> bool {
        let Some(date_input) = update.date.as_ref().or(update.opening_time.as_ref()) else {
            warn!("Schedule update has neither a date nor an opening time");
            return false;
        };
        let Some(date) = date_input.resolve(&self.timezone) else {
            warn!(value = ?date_input, "Invalid schedule date");
            return false;
        };
        let civil = date.date_naive();
        let day = day_index(&date);

        let closed = !update.special && update.kind == CLOSED;
        let opening = match &update.opening_time {
            Some(input) => input.anchor(civil, &self.timezone),
            None if closed => date
                .offset()
                .from_local_datetime(&civil.and_time(NaiveTime::MIN))
                .single(),
            None => None,
        };
        let closing = match &update.closing_time {
            Some(input) => input.anchor(civil, &self.timezone),
            None if closed => civil
                .and_hms_opt(23, 59, 59)
                .and_then(|end| date.offset().from_local_datetime(&end).single()),
            None => None,
        };
        let Some(opening_time) = opening else {
            warn!(value = ?update.opening_time, "Invalid schedule opening time");
            return false;
        };
        let Some(mut closing_time) = closing else {
            warn!(value = ?update.closing_time, "Invalid schedule closing time");
            return false;
        };

        // open past midnight
        if closing_time < opening_time {
            let Some(next_day) = closing_time.checked_add_signed(Duration::days(1)) else {
                warn!(closing = %closing_time, "Schedule closing time out of range");
                return false;
            };
            closing_time = next_day;
        }

        if update.special {
            self.insert_special(day, opening_time, closing_time, update.kind)
        } else {
            let Some(kind) = ScheduleType::from_label(&update.kind) else {
                warn!(
                    kind = %update.kind,
                    "Invalid schedule type (must be Operating, Closed or Refurbishment)"
                );
                return false;
            };
            self.insert_primary(
                day,
                CalendarDay {
                    date: civil,
                    opening_time,
                    closing_time,
                    kind,
                    special: Vec::new(),
                },
            )
        }
    }

    fn insert_primary(&mut self, day: i64, entry: CalendarDay) -> bool {
        if self
            .days
            .get(&day)
            .is_some_and(|existing| existing.identical(&entry))
        {
            trace!(day = day, "Schedule data unchanged");
            return false;
        }
        debug!(date = %entry.date, kind = %entry.kind, "Set schedule date");
        self.days.insert(day, entry);
        self.dirty = true;
        true
    }

    fn insert_special(
        &mut self,
        day: i64,
        opening_time: DateTime<FixedOffset>,
        closing_time: DateTime<FixedOffset>,
        kind: String,
    ) -> bool {
        if kind.is_empty() || kind == OPERATING || kind == CLOSED {
            warn!(
                kind = %kind,
                "Invalid special schedule type (cannot be empty, Operating or Closed)"
            );
            return false;
        }
        let entry = SpecialCalendarEntry {
            opening_time,
            closing_time,
            kind,
        };
        let entries = self.special.entry(day).or_default();
        if entries.iter().any(|existing| existing.identical(&entry)) {
            trace!(day = day, "Special schedule data unchanged");
            return false;
        }
        debug!(day = day, kind = %entry.kind, "Added special schedule");
        entries.push(entry);
        self.dirty = true;
        true
    }

    /// Applies the same hours to every day in `[start_date, end_date]`.
    ///
    /// Every day is attempted even after a failure; the result is `true`
    /// only if every single day was written.
    pub fn set_range(&mut self, update: RangeUpdate) -> bool {
        let (Some(start), Some(end)) = (
            self.civil_date(&update.start_date),
            self.civil_date(&update.end_date),
        ) else {
            warn!(start = ?update.start_date, end = ?update.end_date, "Invalid schedule range");
            return false;
        };
        if update.opening_time.parse().is_none() || update.closing_time.parse().is_none() {
            warn!(
                opening = ?update.opening_time,
                closing = ?update.closing_time,
                "Invalid schedule range hours"
            );
            return false;
        }

        let mut all_set = true;
        for date in start.iter_days().take_while(|date| *date <= end) {
            let set = self.set_date(DateUpdate {
                date: Some(TimeInput::Date(date)),
                opening_time: Some(update.opening_time.clone()),
                closing_time: Some(update.closing_time.clone()),
                kind: update.kind.clone(),
                special: update.special,
            });
            all_set &= set;
        }
        all_set
    }

    /// Returns the entry for one day, with any special hours attached.
    pub fn get_date(&self, date: impl Into<TimeInput>) -> Option<CalendarDay> {
        let date = date.into().resolve(&self.timezone)?;
        self.entry(day_index(&date))
    }

    /// Returns the entries for `[start_date, end_date]`, skipping days with
    /// no data. Invalid bounds yield an empty list.
    pub fn get_date_range(
        &self,
        start_date: impl Into<TimeInput>,
        end_date: impl Into<TimeInput>,
    ) -> Vec<CalendarDay> {
        let (Some(start), Some(end)) = (
            self.civil_date(&start_date.into()),
            self.civil_date(&end_date.into()),
        ) else {
            return Vec::new();
        };
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter_map(|date| self.entry(date_index(date)))
            .collect()
    }

    /// Marks every day in `[from, from + days)` that has no data as `Closed`.
    ///
    /// Returns the number of days filled.
    pub fn fill_closed(&mut self, from: NaiveDate, days: u32) -> usize {
        let mut filled = 0;
        for date in from.iter_days().take(days as usize) {
            if !self.days.contains_key(&date_index(date)) && self.set_date(DateUpdate::closed(date))
            {
                filled += 1;
            }
        }
        if filled > 0 {
            debug!(from = %from, filled = filled, "Filled missing days as Closed");
        }
        filled
    }

    /// Returns the serializable form of this calendar.
    pub fn snapshot(&self) -> CalendarSnapshot {
        CalendarSnapshot {
            dates: self.days.clone(),
            dates_special: self.special.clone(),
        }
    }

    /// Replaces all data with a snapshot. The result matches the cache, so
    /// it is not dirty.
    pub fn restore(&mut self, snapshot: CalendarSnapshot) {
        self.days = snapshot.dates;
        self.special = snapshot.dates_special;
        self.dirty = false;
    }

    fn entry(&self, day: i64) -> Option<CalendarDay> {
        let mut entry = self.days.get(&day)?.clone();
        if let Some(special) = self.special.get(&day) {
            entry.special = special.clone();
        }
        Some(entry)
    }

    fn civil_date(&self, input: &TimeInput) -> Option<NaiveDate> {
        input.resolve(&self.timezone).map(|dt| dt.date_naive())
    }

    /// Returns the civil dates that currently hold primary data.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().filter_map(|day| index_date(*day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_york() -> Calendar {
        Calendar::new("America/New_York".parse().unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod set_date {
        use super::*;

        #[test]
        fn set_then_get() {
            let mut calendar = new_york();
            assert!(calendar.set_date(
                DateUpdate::new("2024-07-04").with_hours("2024-07-04T09:00", "2024-07-04T22:00")
            ));

            let day = calendar.get_date("2024-07-04").unwrap();
            assert_eq!(day.kind, ScheduleType::Operating);
            assert_eq!(day.opening_time.format("%H:%M").to_string(), "09:00");
            assert_eq!(day.closing_time.format("%H:%M").to_string(), "22:00");
            assert!(day.special.is_empty());

            assert!(calendar.get_date("2024-07-05").is_none());
        }

        #[test]
        fn rollover_past_last_date_is_rejected() {
            let mut calendar = Calendar::new(Tz::UTC);
            let last = NaiveDate::MAX;
            assert!(!calendar.set_date(DateUpdate::new(last).with_hours(
                last.and_hms_opt(23, 0, 0).unwrap(),
                last.and_hms_opt(1, 0, 0).unwrap(),
            )));
            assert!(!calendar.set_date(
                DateUpdate::new("+262142-12-31T00:00:00+00:00")
                    .with_hours("+262142-12-31T23:00:00+00:00", "+262142-12-31T01:00:00+00:00")
            ));
            assert!(calendar.is_empty());
            assert!(!calendar.is_dirty());

            // same-day hours on the last date are still fine
            assert!(calendar.set_date(DateUpdate::new(last).with_hours(
                last.and_hms_opt(9, 0, 0).unwrap(),
                last.and_hms_opt(17, 0, 0).unwrap(),
            )));
        }

        #[test]
        fn identical_update_is_a_noop() {
            let mut calendar = new_york();
            let update =
                DateUpdate::new("2024-07-04").with_hours("2024-07-04T09:00", "2024-07-04T22:00");
            assert!(calendar.set_date(update.clone()));
            assert!(calendar.is_dirty());

            calendar.mark_clean();
            assert!(!calendar.set_date(update));
            assert!(!calendar.is_dirty());
        }

        #[test]
        fn changed_hours_replace_entry() {
            let mut calendar = new_york();
            calendar.set_date(
                DateUpdate::new("2024-07-04").with_hours("2024-07-04T09:00", "2024-07-04T22:00"),
            );
            calendar.mark_clean();

            assert!(calendar.set_date(
                DateUpdate::new("2024-07-04").with_hours("2024-07-04T08:00", "2024-07-04T22:00")
            ));
            assert!(calendar.is_dirty());
            assert_eq!(calendar.len(), 1);
            let day = calendar.get_date("2024-07-04").unwrap();
            assert_eq!(day.opening_time.format("%H:%M").to_string(), "08:00");
        }

        #[test]
        fn closing_before_opening_rolls_over() {
            let mut calendar = new_york();
            assert!(calendar.set_date(
                DateUpdate::new("2024-07-04").with_hours("2024-07-04T18:00", "2024-07-04T01:00")
            ));

            let day = calendar.get_date("2024-07-04").unwrap();
            assert!(day.closing_time > day.opening_time);
            assert_eq!(day.closing_time.date_naive(), date(2024, 7, 5));
            assert_eq!(day.closing_time.format("%H:%M").to_string(), "01:00");
        }

        #[test]
        fn times_are_anchored_to_the_date() {
            let mut calendar = new_york();
            // hours copied from another day's feed entry
            assert!(calendar.set_date(
                DateUpdate::new("2024-07-04").with_hours("2024-06-01T09:00", "2024-06-01T17:00")
            ));
            let day = calendar.get_date("2024-07-04").unwrap();
            assert_eq!(day.opening_time.date_naive(), date(2024, 7, 4));
            assert_eq!(day.closing_time.date_naive(), date(2024, 7, 4));
        }

        #[test]
        fn date_defaults_to_opening_time() {
            let mut calendar = new_york();
            assert!(calendar.set_date(DateUpdate::hours(
                "2024-07-04T09:00:00-04:00",
                "2024-07-04T22:00:00-04:00"
            )));
            assert!(calendar.get_date(date(2024, 7, 4)).is_some());
        }

        #[test]
        fn closed_defaults_to_full_day() {
            let mut calendar = new_york();
            assert!(calendar.set_date(DateUpdate::closed("2024-12-25")));

            let day = calendar.get_date("2024-12-25").unwrap();
            assert_eq!(day.kind, ScheduleType::Closed);
            assert_eq!(day.opening_time.format("%H:%M:%S").to_string(), "00:00:00");
            assert_eq!(day.closing_time.format("%H:%M:%S").to_string(), "23:59:59");
        }

        #[test]
        fn operating_without_times_is_rejected() {
            let mut calendar = new_york();
            assert!(!calendar.set_date(DateUpdate::new("2024-07-04")));
            assert!(calendar.is_empty());
        }

        #[test]
        fn invalid_input_is_dropped() {
            let mut calendar = new_york();
            assert!(!calendar.set_date(
                DateUpdate::new("yesterday-ish").with_hours("2024-07-04T09:00", "2024-07-04T22:00")
            ));
            assert!(
                !calendar.set_date(DateUpdate::new("2024-07-04").with_hours("nine", "ten"))
            );
            assert!(!calendar.set_date(DateUpdate::default()));
            assert!(calendar.is_empty());
            assert!(!calendar.is_dirty());
        }

        #[test]
        fn primary_type_must_be_known() {
            let mut calendar = new_york();
            assert!(
                !calendar.set_date(
                    DateUpdate::new("2024-07-04")
                        .with_hours("2024-07-04T09:00", "2024-07-04T22:00")
                        .with_kind("Extra Magic Hours")
                )
            );
            assert!(calendar.set_date(
                DateUpdate::new("2024-07-04")
                    .with_hours("2024-07-04T09:00", "2024-07-04T22:00")
                    .with_kind("Refurbishment")
            ));
            assert_eq!(
                calendar.get_date("2024-07-04").unwrap().kind,
                ScheduleType::Refurbishment
            );
        }

        #[test]
        fn day_boundaries_follow_the_input_offset() {
            let mut calendar = Calendar::new(Tz::UTC);
            // 23:30 in Los Angeles is already the next day in UTC.
            assert!(calendar.set_date(DateUpdate::hours(
                "2024-07-04T23:30:00-07:00",
                "2024-07-04T23:45:00-07:00"
            )));
            let day = calendar.get_date("2024-07-04T12:00:00-07:00").unwrap();
            assert_eq!(day.date, date(2024, 7, 4));
            assert!(calendar.get_date("2024-07-05T01:00:00+00:00").is_none());
        }
    }

    mod special {
        use super::*;

        fn extra_hours(open: &str, close: &str, kind: &str) -> DateUpdate {
            DateUpdate::new("2024-07-04")
                .with_hours(open, close)
                .as_special(kind)
        }

        #[test]
        fn duplicates_are_rejected() {
            let mut calendar = new_york();
            let update = extra_hours("2024-07-04T07:00", "2024-07-04T09:00", "Early Entry");
            assert!(calendar.set_date(update.clone()));
            calendar.mark_clean();
            assert!(!calendar.set_date(update));
            assert!(!calendar.is_dirty());
        }

        #[test]
        fn distinct_entries_are_additive() {
            let mut calendar = new_york();
            calendar.set_date(
                DateUpdate::new("2024-07-04").with_hours("2024-07-04T09:00", "2024-07-04T22:00"),
            );
            assert!(calendar.set_date(extra_hours(
                "2024-07-04T07:00",
                "2024-07-04T09:00",
                "Early Entry"
            )));
            assert!(calendar.set_date(extra_hours(
                "2024-07-04T22:00",
                "2024-07-05T00:00",
                "Extended Evening"
            )));

            let day = calendar.get_date("2024-07-04").unwrap();
            assert_eq!(day.special.len(), 2);
            assert_eq!(day.special[0].kind, "Early Entry");
            assert_eq!(day.special[1].kind, "Extended Evening");
            assert_eq!(day.kind, ScheduleType::Operating);
        }

        #[test]
        fn reserved_types_are_rejected() {
            let mut calendar = new_york();
            for kind in [OPERATING, CLOSED, ""] {
                assert!(!calendar.set_date(extra_hours(
                    "2024-07-04T07:00",
                    "2024-07-04T09:00",
                    kind
                )));
            }
            assert!(!calendar.is_dirty());
        }

        #[test]
        fn special_without_primary_is_not_returned() {
            let mut calendar = new_york();
            calendar.set_date(extra_hours(
                "2024-07-04T07:00",
                "2024-07-04T09:00",
                "Early Entry",
            ));
            assert!(calendar.get_date("2024-07-04").is_none());
        }
    }

    mod ranges {
        use super::*;

        #[test]
        fn set_range_then_get_range() {
            let mut calendar = new_york();
            assert!(calendar.set_range(RangeUpdate::new(
                "2024-07-01",
                "2024-07-10",
                "2024-07-01T10:00",
                "2024-07-01T18:00",
            )));

            let days = calendar.get_date_range("2024-07-01", "2024-07-10");
            assert_eq!(days.len(), 10);
            for (offset, day) in days.iter().enumerate() {
                assert_eq!(day.date, date(2024, 7, 1 + offset as u32));
                assert_eq!(day.kind, ScheduleType::Operating);
                assert_eq!(day.opening_time.format("%H:%M").to_string(), "10:00");
                assert_eq!(day.closing_time.format("%H:%M").to_string(), "18:00");
            }
        }

        #[test]
        fn range_keeps_going_after_a_failure() {
            let mut calendar = new_york();
            calendar.set_date(
                DateUpdate::new("2024-07-02").with_hours("2024-07-02T10:00", "2024-07-02T18:00"),
            );

            // 07-02 is already identical, so the range reports failure...
            assert!(!calendar.set_range(RangeUpdate::new(
                "2024-07-01",
                "2024-07-03",
                "2024-07-01T10:00",
                "2024-07-01T18:00",
            )));
            // ...but every other day was still written.
            assert_eq!(calendar.get_date_range("2024-07-01", "2024-07-03").len(), 3);
        }

        #[test]
        fn invalid_range_writes_nothing() {
            let mut calendar = new_york();
            assert!(!calendar.set_range(RangeUpdate::new(
                "2024-07-01",
                "someday",
                "2024-07-01T10:00",
                "2024-07-01T18:00",
            )));
            assert!(!calendar.set_range(
                RangeUpdate::new("2024-07-01", "2024-07-03", "10am", "2024-07-01T18:00")
            ));
            assert!(calendar.is_empty());
        }

        #[test]
        fn range_follows_dst() {
            let mut calendar = new_york();
            assert!(calendar.set_range(RangeUpdate::new(
                "2024-03-09",
                "2024-03-11",
                "2024-03-09T09:00",
                "2024-03-09T21:00",
            )));
            let before = calendar.get_date("2024-03-09").unwrap();
            let after = calendar.get_date("2024-03-11").unwrap();
            assert_eq!(before.opening_time.offset().local_minus_utc(), -5 * 3600);
            assert_eq!(after.opening_time.offset().local_minus_utc(), -4 * 3600);
            assert_eq!(after.opening_time.format("%H:%M").to_string(), "09:00");
        }

        #[test]
        fn special_ranges() {
            let mut calendar = new_york();
            assert!(calendar.set_range(
                RangeUpdate::new(
                    "2024-10-01",
                    "2024-10-03",
                    "2024-10-01T19:00",
                    "2024-10-01T23:00",
                )
                .as_special("Halloween Party")
            ));
            calendar.fill_closed(date(2024, 10, 1), 3);
            let days = calendar.get_date_range("2024-10-01", "2024-10-03");
            assert_eq!(days.len(), 3);
            assert!(days.iter().all(|day| day.special.len() == 1));
        }

        #[test]
        fn get_range_skips_missing_days() {
            let mut calendar = new_york();
            calendar.set_date(
                DateUpdate::new("2024-07-01").with_hours("2024-07-01T10:00", "2024-07-01T18:00"),
            );
            calendar.set_date(DateUpdate::closed("2024-07-05"));

            let days = calendar.get_date_range("2024-07-01", "2024-07-31");
            assert_eq!(days.len(), 2);
            assert_eq!(days[1].kind, ScheduleType::Closed);

            assert!(calendar.get_date_range("garbage", "2024-07-31").is_empty());
        }
    }

    #[test]
    fn fill_closed_only_touches_missing_days() {
        let mut calendar = new_york();
        calendar.set_date(
            DateUpdate::new("2024-07-02").with_hours("2024-07-02T10:00", "2024-07-02T18:00"),
        );

        assert_eq!(calendar.fill_closed(date(2024, 7, 1), 5), 4);
        assert_eq!(calendar.len(), 5);
        assert!(calendar.get_date("2024-07-02").unwrap().is_operating());
        assert_eq!(
            calendar.get_date("2024-07-05").unwrap().kind,
            ScheduleType::Closed
        );
        assert!(calendar.get_date("2024-07-06").is_none());

        calendar.mark_clean();
        assert_eq!(calendar.fill_closed(date(2024, 7, 1), 5), 0);
        assert!(!calendar.is_dirty());
    }

    #[test]
    fn snapshot_roundtrip_through_json() {
        let mut calendar = new_york();
        calendar.set_date(
            DateUpdate::new("2024-07-04").with_hours("2024-07-04T09:00", "2024-07-04T22:00"),
        );
        calendar.set_date(
            DateUpdate::new("2024-07-04")
                .with_hours("2024-07-04T07:00", "2024-07-04T09:00")
                .as_special("Early Entry"),
        );

        let json = serde_json::to_string(&calendar.snapshot()).unwrap();
        let snapshot: CalendarSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = new_york();
        restored.restore(snapshot);
        assert!(!restored.is_dirty());
        assert_eq!(
            restored.get_date("2024-07-04"),
            calendar.get_date("2024-07-04")
        );
        assert_eq!(
            restored.dates().collect::<Vec<_>>(),
            vec![date(2024, 7, 4)]
        );
    }

    #[test]
    fn calendar_day_wire_shape() {
        let mut calendar = new_york();
        calendar.set_date(
            DateUpdate::new("2024-07-04").with_hours("2024-07-04T09:00", "2024-07-04T22:00"),
        );
        let day = calendar.get_date("2024-07-04").unwrap();
        insta::assert_json_snapshot!(day, @r###"
        {
          "date": "2024-07-04",
          "openingTime": "2024-07-04T09:00:00-04:00",
          "closingTime": "2024-07-04T22:00:00-04:00",
          "type": "Operating"
        }
        "###);
    }
}
