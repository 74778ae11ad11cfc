//! Capability interfaces implemented by a map surface.

use fmap_core::{Frame, LatLngBounds, MapError, MapType, ViewId};

/// Map-level options writable from the UI layer.
///
/// Every setter is idempotent and all-or-nothing: on error nothing changed.
/// Effects are observed through the surface's state accessors.
pub trait MapOptionsSink {
    /// Restrict the camera target to `bounds`; `None` lifts the restriction.
    fn set_camera_target_bounds(&mut self, bounds: Option<LatLngBounds>) -> Result<(), MapError>;

    fn set_compass_enabled(&mut self, enabled: bool) -> Result<(), MapError>;

    fn set_map_type(&mut self, map_type: MapType) -> Result<(), MapError>;

    /// Apply a JSON style descriptor, or restore the default with `None`.
    fn set_map_style(&mut self, style: Option<&str>) -> Result<(), MapError>;

    /// Clamp camera zoom; `None` on either side means the native limit.
    fn set_zoom_range(&mut self, min: Option<f64>, max: Option<f64>) -> Result<(), MapError>;

    fn set_rotate_gestures_enabled(&mut self, enabled: bool) -> Result<(), MapError>;

    fn set_scroll_gestures_enabled(&mut self, enabled: bool) -> Result<(), MapError>;

    fn set_tilt_gestures_enabled(&mut self, enabled: bool) -> Result<(), MapError>;

    fn set_zoom_gestures_enabled(&mut self, enabled: bool) -> Result<(), MapError>;

    /// Report settled camera movements upward.
    fn set_track_camera_position(&mut self, enabled: bool) -> Result<(), MapError>;

    /// Show the user's location. Without the location permission the layer
    /// stays hidden until the permission is granted.
    fn set_my_location_enabled(&mut self, enabled: bool) -> Result<(), MapError>;
}

/// A view embedded into the host's UI tree.
pub trait PlatformView {
    fn view_id(&self) -> ViewId;

    fn frame(&self) -> Frame;

    /// Place the view's origin at `(x, y)` and make it visible.
    fn show(&mut self, x: f64, y: f64) -> Result<(), MapError>;

    /// Hide the view, keeping camera and overlays.
    fn hide(&mut self) -> Result<(), MapError>;

    fn is_visible(&self) -> bool;
}
