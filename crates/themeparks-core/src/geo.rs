//! Geographic coordinates for parks and rides.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized latitude/longitude pair.
///
/// Longitude is wrapped into `(-180, 180]` and latitude is clamped into
/// `[-90, 90]`, so going too far north never wraps around to the south.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLocation", into = "RawLocation")]
pub struct GeoLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

impl From<RawLocation> for GeoLocation {
    fn from(raw: RawLocation) -> Self {
        GeoLocation::new(raw.latitude, raw.longitude)
    }
}

impl From<GeoLocation> for RawLocation {
    fn from(location: GeoLocation) -> Self {
        RawLocation {
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

impl GeoLocation {
    /// Creates a new location, normalizing both coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        let mut longitude = longitude % 360.0;
        if longitude > 180.0 {
            longitude -= 360.0;
        } else if longitude <= -180.0 {
            longitude += 360.0;
        }
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude,
        }
    }

    /// Raw latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Raw longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude formatted as degrees, minutes and seconds (`28°25′3.60″N`).
    pub fn latitude_dms(&self) -> String {
        if self.latitude < 0.0 {
            format!("{}S", format_dms(-self.latitude))
        } else {
            format!("{}N", format_dms(self.latitude))
        }
    }

    /// Longitude formatted as degrees, minutes and seconds (`81°34′51.60″W`).
    pub fn longitude_dms(&self) -> String {
        if self.longitude < 0.0 {
            format!("{}W", format_dms(-self.longitude))
        } else {
            format!("{}E", format_dms(self.longitude))
        }
    }

    /// Returns a Google Maps URL pointing at this location.
    pub fn google_maps_url(&self) -> String {
        format!(
            "http://maps.google.com/?ll={},{}",
            self.latitude, self.longitude
        )
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude_dms(), self.longitude_dms())
    }
}

fn format_dms(value: f64) -> String {
    let degrees = value.floor();
    let minutes = ((value % 1.0) * 60.0).floor();
    let seconds = ((value * 60.0) % 1.0) * 60.0;
    format!("{}\u{00B0}{}\u{2032}{:.2}\u{2033}", degrees, minutes, seconds)
}
