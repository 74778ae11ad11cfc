//! Geographic primitives and view geometry.

use crate::error::MapError;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned identifier of one embedded map view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub i64);

impl ViewId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "View({})", self.0)
    }
}

/// A latitude/longitude pair in degrees.
///
/// Crosses the bridge as a `[latitude, longitude]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Reject non-finite coordinates.
    pub fn validate(self) -> Result<Self, MapError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(MapError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.latitude, value.longitude]
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A rectangular geographic area.
///
/// When `southwest.longitude > northeast.longitude` the bounds cross the
/// antimeridian. Crosses the bridge as `[southwest, northeast]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[LatLng; 2]", into = "[LatLng; 2]")]
pub struct LatLngBounds {
    southwest: LatLng,
    northeast: LatLng,
}

impl LatLngBounds {
    pub fn new(southwest: LatLng, northeast: LatLng) -> Result<Self, MapError> {
        southwest.validate()?;
        northeast.validate()?;
        if southwest.latitude > northeast.latitude {
            return Err(MapError::range(
                "bounds",
                format!(
                    "southwest latitude {} is north of northeast latitude {}",
                    southwest.latitude, northeast.latitude
                ),
            ));
        }
        Ok(Self {
            southwest,
            northeast,
        })
    }

    pub fn southwest(&self) -> LatLng {
        self.southwest
    }

    pub fn northeast(&self) -> LatLng {
        self.northeast
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.southwest.longitude > self.northeast.longitude
    }

    pub fn contains(&self, point: LatLng) -> bool {
        let lat_ok = (self.southwest.latitude..=self.northeast.latitude).contains(&point.latitude);
        let lng_ok = if self.crosses_antimeridian() {
            point.longitude >= self.southwest.longitude
                || point.longitude <= self.northeast.longitude
        } else {
            (self.southwest.longitude..=self.northeast.longitude).contains(&point.longitude)
        };
        lat_ok && lng_ok
    }

    /// Nearest point inside the bounds.
    pub fn clamp(&self, point: LatLng) -> LatLng {
        if self.contains(point) {
            return point;
        }
        let latitude = point
            .latitude
            .clamp(self.southwest.latitude, self.northeast.latitude);
        let longitude = if self.crosses_antimeridian() {
            let inside = point.longitude >= self.southwest.longitude
                || point.longitude <= self.northeast.longitude;
            if inside {
                point.longitude
            } else {
                let to_west = self.southwest.longitude - point.longitude;
                let to_east = point.longitude - self.northeast.longitude;
                if to_west <= to_east {
                    self.southwest.longitude
                } else {
                    self.northeast.longitude
                }
            }
        } else {
            point
                .longitude
                .clamp(self.southwest.longitude, self.northeast.longitude)
        };
        LatLng::new(latitude, longitude)
    }
}

impl TryFrom<[LatLng; 2]> for LatLngBounds {
    type Error = MapError;

    fn try_from([southwest, northeast]: [LatLng; 2]) -> Result<Self, Self::Error> {
        Self::new(southwest, northeast)
    }
}

impl From<LatLngBounds> for [LatLng; 2] {
    fn from(value: LatLngBounds) -> Self {
        [value.southwest, value.northeast]
    }
}

/// Position and size of a map view inside the host, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Same size, new origin.
    pub fn moved_to(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }
}
