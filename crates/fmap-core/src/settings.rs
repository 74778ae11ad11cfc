//! Map-level settings as requested by the UI layer.

use crate::camera::{MAX_ZOOM, MIN_ZOOM};
use crate::error::MapError;
use crate::geo::LatLngBounds;
use crate::style::MapStyle;
use serde::{Deserialize, Serialize};

/// Base map imagery.
///
/// Crosses the bridge as its index: none, normal, satellite, terrain, hybrid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MapType {
    None,
    #[default]
    Normal,
    Satellite,
    Terrain,
    Hybrid,
}

impl TryFrom<u8> for MapType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Normal),
            2 => Ok(Self::Satellite),
            3 => Ok(Self::Terrain),
            4 => Ok(Self::Hybrid),
            other => Err(format!("unknown map type index {other}")),
        }
    }
}

impl From<MapType> for u8 {
    fn from(value: MapType) -> Self {
        match value {
            MapType::None => 0,
            MapType::Normal => 1,
            MapType::Satellite => 2,
            MapType::Terrain => 3,
            MapType::Hybrid => 4,
        }
    }
}

/// Optional camera zoom clamp. `None` on either side means the native limit.
///
/// Crosses the bridge as `[min, max]` with nulls for unset sides.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(Option<f64>, Option<f64>)", into = "(Option<f64>, Option<f64>)")]
pub struct ZoomRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl ZoomRange {
    /// No clamp beyond the native limits.
    pub const UNBOUNDED: ZoomRange = ZoomRange {
        min: None,
        max: None,
    };

    /// Build a validated range.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, MapError> {
        Self { min, max }.validate()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Effective lower limit.
    pub fn lower(&self) -> f64 {
        self.min.unwrap_or(MIN_ZOOM)
    }

    /// Effective upper limit.
    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(MAX_ZOOM)
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.lower(), self.upper())
    }

    /// Check a range that arrived undecoded from the bridge.
    pub fn validate(self) -> Result<Self, MapError> {
        for bound in [self.min, self.max].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(MapError::range("zoom", format!("{bound} is not a zoom level")));
            }
            if !(MIN_ZOOM..=MAX_ZOOM).contains(&bound) {
                return Err(MapError::range(
                    "zoom",
                    format!("{bound} is outside the native zoom levels {MIN_ZOOM}..={MAX_ZOOM}"),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(MapError::range(
                    "zoom",
                    format!("min zoom {min} exceeds max zoom {max}"),
                ));
            }
        }
        Ok(self)
    }
}

impl From<(Option<f64>, Option<f64>)> for ZoomRange {
    fn from((min, max): (Option<f64>, Option<f64>)) -> Self {
        Self { min, max }
    }
}

impl From<ZoomRange> for (Option<f64>, Option<f64>) {
    fn from(value: ZoomRange) -> Self {
        (value.min, value.max)
    }
}

/// Camera target restriction. `TargetBounds(None)` lifts the restriction.
///
/// Crosses the bridge as a one-element array: `[bounds]` or `[null]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(Option<LatLngBounds>,)", into = "(Option<LatLngBounds>,)")]
pub struct TargetBounds(pub Option<LatLngBounds>);

impl From<(Option<LatLngBounds>,)> for TargetBounds {
    fn from((bounds,): (Option<LatLngBounds>,)) -> Self {
        Self(bounds)
    }
}

impl From<TargetBounds> for (Option<LatLngBounds>,) {
    fn from(value: TargetBounds) -> Self {
        (value.0,)
    }
}

/// The full set of map-level options currently in effect on a surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSettings {
    pub camera_target_bounds: Option<LatLngBounds>,
    pub compass_enabled: bool,
    pub map_type: MapType,
    pub map_style: Option<MapStyle>,
    pub zoom_range: ZoomRange,
    pub rotate_gestures_enabled: bool,
    pub scroll_gestures_enabled: bool,
    pub tilt_gestures_enabled: bool,
    pub zoom_gestures_enabled: bool,
    pub track_camera_position: bool,
    /// Whether the caller asked for the location layer; display also needs permission.
    pub my_location_enabled: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            camera_target_bounds: None,
            compass_enabled: true,
            map_type: MapType::Normal,
            map_style: None,
            zoom_range: ZoomRange::UNBOUNDED,
            rotate_gestures_enabled: true,
            scroll_gestures_enabled: true,
            tilt_gestures_enabled: true,
            zoom_gestures_enabled: true,
            track_camera_position: false,
            my_location_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;

    #[test]
    fn test_zoom_range_validation() {
        assert!(ZoomRange::new(Some(3.0), Some(5.0)).is_ok());
        assert!(ZoomRange::new(Some(5.0), Some(5.0)).is_ok());
        assert!(matches!(
            ZoomRange::new(Some(5.0), Some(3.0)),
            Err(MapError::InvalidRange { field: "zoom", .. })
        ));
        assert!(ZoomRange::new(Some(f64::NAN), None).is_err());
    }

    #[test]
    fn test_zoom_range_within_native_limits() {
        assert!(ZoomRange::new(Some(0.0), Some(21.0)).is_ok());
        assert!(ZoomRange::new(None, Some(21.0)).is_ok());
        assert!(matches!(
            ZoomRange::new(None, Some(21.5)),
            Err(MapError::InvalidRange { field: "zoom", .. })
        ));
        assert!(ZoomRange::new(Some(22.0), Some(23.0)).is_err());
        assert!(ZoomRange::new(Some(-5.0), Some(3.0)).is_err());
        assert!(ZoomRange::from((Some(21.5), None)).validate().is_err());
    }

    #[test]
    fn test_zoom_range_clamp() {
        let range = ZoomRange::new(Some(4.0), None).unwrap();
        assert_eq!(range.clamp(1.0), 4.0);
        assert_eq!(range.clamp(30.0), MAX_ZOOM);
        assert_eq!(ZoomRange::UNBOUNDED.clamp(-1.0), MIN_ZOOM);
    }

    #[test]
    fn test_wire_formats() {
        let map_type: MapType = serde_json::from_str("2").unwrap();
        assert_eq!(map_type, MapType::Satellite);
        assert!(serde_json::from_str::<MapType>("9").is_err());

        let range: ZoomRange = serde_json::from_str("[null, 12.5]").unwrap();
        assert_eq!(range.min(), None);
        assert_eq!(range.max(), Some(12.5));

        let bounds: TargetBounds = serde_json::from_str("[null]").unwrap();
        assert_eq!(bounds, TargetBounds(None));
        let bounds: TargetBounds = serde_json::from_str("[[[0, 0], [1, 1]]]").unwrap();
        assert_eq!(bounds.0.unwrap().northeast(), LatLng::new(1.0, 1.0));
    }
}
