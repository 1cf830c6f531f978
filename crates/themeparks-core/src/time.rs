//! Time helpers for schedule data.
//!
//! Schedules are keyed by a small integer *day index*: the number of civil
//! days since the Unix epoch, computed in the instant's own UTC offset. A
//! date presented in its local calendar therefore maps to the same index no
//! matter which absolute-time representation carried it.
//!
//! [`TimeInput`] is the loose input type accepted by the calendar engine.
//! Adapters hand it whatever they scraped (RFC 3339 strings, naive local
//! strings, chrono values); values without an offset are interpreted in the
//! calendar's timezone.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{CoreError, CoreResult};

/// Minutes in a civil day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%z"];

const FLOATING_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Returns the day index of an instant, using its own UTC offset.
pub fn day_index<Z: TimeZone>(dt: &DateTime<Z>) -> i64 {
    let offset_minutes = i64::from(dt.offset().fix().local_minus_utc()) / 60;
    let minutes = dt.timestamp().div_euclid(60) + offset_minutes;
    minutes.div_euclid(MINUTES_PER_DAY)
}

/// Returns the day index of a civil date.
pub fn date_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

/// Converts a day index back to its civil date.
pub fn index_date(day: i64) -> Option<NaiveDate> {
    let days_from_ce = i32::try_from(day + UNIX_EPOCH_DAYS_FROM_CE).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days_from_ce)
}

/// Returns the current civil date in the given timezone.
pub fn today_in(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Parses an IANA timezone name.
pub fn parse_timezone(name: &str) -> CoreResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| CoreError::InvalidTimezone(name.to_string()))
}

/// Resolves a local wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap are pushed forward by an hour.
pub fn localize(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        })
        .map(|dt| dt.with_timezone(&dt.offset().fix()))
}

/// A schedule time as supplied by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeInput {
    /// Unparsed text; see [`TimeInput::parse`] for accepted formats.
    Text(String),
    /// An instant with a known offset.
    Instant(DateTime<FixedOffset>),
    /// A wall-clock time with no offset.
    Local(NaiveDateTime),
    /// A civil date (midnight, no offset).
    Date(NaiveDate),
}

/// A parsed [`TimeInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTime {
    /// Carries its own offset.
    Zoned(DateTime<FixedOffset>),
    /// Needs a timezone to become an instant.
    Floating(NaiveDateTime),
}

impl ParsedTime {
    fn wall_time(&self) -> NaiveTime {
        match self {
            Self::Zoned(dt) => dt.time(),
            Self::Floating(naive) => naive.time(),
        }
    }

    /// Returns the civil date as written by the caller.
    pub fn local_date(&self) -> NaiveDate {
        match self {
            Self::Zoned(dt) => dt.date_naive(),
            Self::Floating(naive) => naive.date(),
        }
    }
}

impl TimeInput {
    /// Parses the input.
    ///
    /// Accepted text forms are RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` with an
    /// optional `±HHMM` offset, `YYYY-MM-DD HH:MM[:SS]` and `YYYY-MM-DD`.
    pub fn parse(&self) -> Option<ParsedTime> {
        match self {
            Self::Instant(dt) => Some(ParsedTime::Zoned(*dt)),
            Self::Local(naive) => Some(ParsedTime::Floating(*naive)),
            Self::Date(date) => Some(ParsedTime::Floating(date.and_time(NaiveTime::MIN))),
            Self::Text(text) => parse_text(text.trim()),
        }
    }

    /// Resolves the input to an instant, using `tz` when it has no offset.
    pub fn resolve(&self, tz: &Tz) -> Option<DateTime<FixedOffset>> {
        match self.parse()? {
            ParsedTime::Zoned(dt) => Some(dt),
            ParsedTime::Floating(naive) => localize(naive, tz),
        }
    }

    /// Re-anchors the input's wall-clock time onto `date`.
    ///
    /// Zoned inputs keep their offset; floating inputs are resolved in `tz`
    /// for the target date, so DST changes inside a range are honoured.
    pub fn anchor(&self, date: NaiveDate, tz: &Tz) -> Option<DateTime<FixedOffset>> {
        let parsed = self.parse()?;
        let naive = date.and_time(parsed.wall_time());
        match parsed {
            ParsedTime::Zoned(dt) => dt.offset().from_local_datetime(&naive).single(),
            ParsedTime::Floating(_) => localize(naive, tz),
        }
    }

    /// Returns the civil date this input refers to.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.parse().map(|parsed| parsed.local_date())
    }
}

fn parse_text(text: &str) -> Option<ParsedTime> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedTime::Zoned(dt));
    }
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(ParsedTime::Zoned(dt));
        }
    }
    for format in FLOATING_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ParsedTime::Floating(naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| ParsedTime::Floating(date.and_time(NaiveTime::MIN)))
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for TimeInput {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<NaiveDate> for TimeInput {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Local(value)
    }
}

impl<Z: TimeZone> From<DateTime<Z>> for TimeInput {
    fn from(value: DateTime<Z>) -> Self {
        let offset = value.offset().fix();
        Self::Instant(value.with_timezone(&offset))
    }
}
