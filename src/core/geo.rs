//! Coordinates and the serviceable region
//!
//! Routing is only supported inside a fixed bounding box around Calgary. Both
//! endpoints are checked here before anything is sent to the routing service.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::{Endpoint, Error, Result};

/// A WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a GeoJSON position, which is ordered `[lon, lat]`
    pub fn from_lon_lat(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

// The backend exchanges points as `[lat, lon]` pairs
impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        [self.lat, self.lon].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let [lat, lon] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Self::new(lat, lon))
    }
}

/// Inclusive latitude/longitude box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}

/// Region the routing backend can serve
pub const CALGARY_BOUNDS: Bounds = Bounds {
    min_lat: 50.842,
    max_lat: 51.212,
    min_lon: -114.315,
    max_lon: -113.860,
};

/// Default map view centre (downtown Calgary)
pub const CALGARY_CENTER: GeoPoint = GeoPoint::new(51.0447, -114.0719);

/// Check that an endpoint lies inside the serviceable region
pub fn validate(point: GeoPoint, endpoint: Endpoint) -> Result<GeoPoint> {
    if CALGARY_BOUNDS.contains(&point) {
        Ok(point)
    } else {
        Err(Error::OutOfBounds { endpoint, point })
    }
}
