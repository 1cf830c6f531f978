//! Core types: calendar engine, rides, registry, geolocation, time helpers

use std::future::Future;
use std::pin::Pin;

pub mod calendar;
pub mod error;
pub mod geo;
pub mod registry;
pub mod ride;
pub mod time;
pub mod tracing;

pub use calendar::{
    Calendar, CalendarDay, CalendarSnapshot, DateUpdate, RangeUpdate, ScheduleType,
    SpecialCalendarEntry,
};
pub use error::{CoreError, CoreResult};
pub use geo::GeoLocation;
pub use registry::Registry;
pub use ride::{
    FastPassReturnTime, FastPassWindow, Ride, RideSnapshot, RideStatus, WAIT_CLOSED, WAIT_DOWN,
};
pub use time::{TimeInput, date_index, day_index, parse_timezone, today_in};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};

/// A boxed future, used for async methods on object-safe traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
