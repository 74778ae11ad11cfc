//! Option records decoded from the UI layer.

use fmap_core::{CameraPosition, MapType, TargetBounds, ZoomRange};
use serde::{Deserialize, Deserializer};

/// A partial set of map options. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapOptions {
    pub camera_target_bounds: Option<TargetBounds>,
    pub compass_enabled: Option<bool>,
    pub map_type: Option<MapType>,
    /// `Some(None)` (an explicit null) restores the default style.
    #[serde(deserialize_with = "present")]
    pub map_style: Option<Option<String>>,
    pub min_max_zoom_preference: Option<ZoomRange>,
    pub rotate_gestures_enabled: Option<bool>,
    pub scroll_gestures_enabled: Option<bool>,
    pub tilt_gestures_enabled: Option<bool>,
    pub zoom_gestures_enabled: Option<bool>,
    pub track_camera_position: Option<bool>,
    pub my_location_enabled: Option<bool>,
}

/// Arguments attached to a surface creation request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreationParams {
    pub initial_camera_position: Option<CameraPosition>,
    pub options: MapOptions,
}

/// Distinguish an explicit `null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
