//! Camera positions and camera-update descriptors.
//!
//! Updates are resolved against the current camera and the viewport size
//! using a Web Mercator world that is 256 px wide at zoom 0.

use crate::error::MapError;
use crate::geo::{LatLng, LatLngBounds};
use crate::settings::ZoomRange;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Lowest zoom level the native map accepts.
pub const MIN_ZOOM: f64 = 0.0;

/// Highest zoom level the native map accepts.
pub const MAX_ZOOM: f64 = 21.0;

/// Steepest camera tilt, in degrees.
const MAX_TILT: f64 = 67.5;

/// World width in pixels at zoom 0.
const TILE_SIZE: f64 = 256.0;

/// Mercator is undefined at the poles; clamp sin(latitude) short of ±1.
const MAX_SIN_LATITUDE: f64 = 0.9999;

/// A full camera state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub target: LatLng,
    pub zoom: f64,
    #[serde(default)]
    pub bearing: f64,
    #[serde(default)]
    pub tilt: f64,
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), MIN_ZOOM)
    }
}

impl CameraPosition {
    pub fn new(target: LatLng, zoom: f64) -> Self {
        Self {
            target,
            zoom,
            bearing: 0.0,
            tilt: 0.0,
        }
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    pub fn with_tilt(mut self, tilt: f64) -> Self {
        self.tilt = tilt;
        self
    }

    /// Reject non-finite components and bring the rest into native ranges.
    ///
    /// Bearing is wrapped into `[0, 360)`, tilt and zoom are clamped.
    pub fn normalized(self) -> Result<Self, MapError> {
        let finite = self.target.is_finite()
            && self.zoom.is_finite()
            && self.bearing.is_finite()
            && self.tilt.is_finite();
        if !finite {
            return Err(MapError::InvalidCameraUpdate(format!(
                "non-finite camera position: target {}, zoom {}, bearing {}, tilt {}",
                self.target, self.zoom, self.bearing, self.tilt
            )));
        }
        Ok(Self {
            target: LatLng::new(self.target.latitude, wrap_longitude(self.target.longitude)),
            zoom: self.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            bearing: self.bearing.rem_euclid(360.0),
            tilt: self.tilt.clamp(0.0, MAX_TILT),
        })
    }

    /// Linear blend towards `to`; bearing takes the shorter way round.
    pub fn interpolate(&self, to: &CameraPosition, t: f64) -> CameraPosition {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        let mut bearing_delta = (to.bearing - self.bearing).rem_euclid(360.0);
        if bearing_delta > 180.0 {
            bearing_delta -= 360.0;
        }
        CameraPosition {
            target: LatLng::new(
                lerp(self.target.latitude, to.target.latitude),
                lerp(self.target.longitude, to.target.longitude),
            ),
            zoom: lerp(self.zoom, to.zoom),
            bearing: (self.bearing + bearing_delta * t).rem_euclid(360.0),
            tilt: lerp(self.tilt, to.tilt),
        }
    }
}

/// A requested camera change.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraUpdate {
    /// Jump to a complete camera state.
    NewCameraPosition(CameraPosition),
    /// Re-center, keeping zoom, bearing and tilt.
    NewLatLng(LatLng),
    /// Re-center and zoom.
    NewLatLngZoom(LatLng, f64),
    /// Fit `bounds` into the viewport, leaving `padding` px on every side.
    NewLatLngBounds { bounds: LatLngBounds, padding: f64 },
    /// Pan by a screen-space offset in pixels.
    ScrollBy { dx: f64, dy: f64 },
    /// Relative zoom, optionally keeping the screen point `focus` fixed.
    ZoomBy { amount: f64, focus: Option<DVec2> },
    ZoomIn,
    ZoomOut,
    ZoomTo(f64),
}

impl CameraUpdate {
    /// Compute the camera this update leads to from `current`.
    ///
    /// `viewport` is the size of the map view in pixels. Nothing is applied
    /// here; a malformed update fails without side effects.
    pub fn resolve(
        &self,
        current: &CameraPosition,
        viewport: DVec2,
    ) -> Result<CameraPosition, MapError> {
        self.resolve_within(current, viewport, &ZoomRange::UNBOUNDED)
    }

    /// Like [`resolve`](Self::resolve), for a map whose zoom is clamped to
    /// `zoom_range`. A focused zoom keeps its focus point fixed at the zoom
    /// actually reached.
    pub fn resolve_within(
        &self,
        current: &CameraPosition,
        viewport: DVec2,
        zoom_range: &ZoomRange,
    ) -> Result<CameraPosition, MapError> {
        let next = match *self {
            CameraUpdate::NewCameraPosition(position) => position,
            CameraUpdate::NewLatLng(target) => CameraPosition {
                target: checked_target(target)?,
                ..*current
            },
            CameraUpdate::NewLatLngZoom(target, zoom) => CameraPosition {
                target: checked_target(target)?,
                zoom: checked("zoom", zoom)?,
                ..*current
            },
            CameraUpdate::NewLatLngBounds { bounds, padding } => {
                fit_bounds(&bounds, checked("padding", padding)?, viewport)?
            }
            CameraUpdate::ScrollBy { dx, dy } => {
                let offset = DVec2::new(checked("dx", dx)?, checked("dy", dy)?);
                let center = project(current.target, current.zoom);
                let moved = center + screen_to_world(offset, current.bearing);
                CameraPosition {
                    target: unproject(moved, current.zoom),
                    ..*current
                }
            }
            CameraUpdate::ZoomBy { amount, focus } => {
                let amount = checked("zoom amount", amount)?;
                let zoom = zoom_range.clamp(current.zoom + amount);
                let target = match focus {
                    Some(focus) if focus.is_finite() => {
                        zoom_around(current, focus, viewport, zoom - current.zoom)
                    }
                    Some(focus) => {
                        return Err(MapError::InvalidCameraUpdate(format!(
                            "non-finite zoom focus {focus}"
                        )));
                    }
                    None => current.target,
                };
                CameraPosition {
                    target,
                    zoom,
                    ..*current
                }
            }
            CameraUpdate::ZoomIn => CameraPosition {
                zoom: current.zoom + 1.0,
                ..*current
            },
            CameraUpdate::ZoomOut => CameraPosition {
                zoom: current.zoom - 1.0,
                ..*current
            },
            CameraUpdate::ZoomTo(zoom) => CameraPosition {
                zoom: checked("zoom", zoom)?,
                ..*current
            },
        };
        next.normalized()
    }
}

fn checked(field: &str, value: f64) -> Result<f64, MapError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MapError::InvalidCameraUpdate(format!("{field} is {value}")))
    }
}

fn checked_target(target: LatLng) -> Result<LatLng, MapError> {
    if target.is_finite() {
        Ok(target)
    } else {
        Err(MapError::InvalidCameraUpdate(format!("non-finite target {target}")))
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

fn project(point: LatLng, zoom: f64) -> DVec2 {
    let size = world_size(zoom);
    let sin_lat = point
        .latitude
        .to_radians()
        .sin()
        .clamp(-MAX_SIN_LATITUDE, MAX_SIN_LATITUDE);
    DVec2::new(
        (point.longitude + 180.0) / 360.0 * size,
        (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * size,
    )
}

fn unproject(point: DVec2, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let n = PI - 2.0 * PI * point.y / size;
    LatLng::new(
        n.sinh().atan().to_degrees(),
        wrap_longitude(point.x / size * 360.0 - 180.0),
    )
}

/// Screen offsets are rotated by the camera bearing before reaching the world.
fn screen_to_world(offset: DVec2, bearing: f64) -> DVec2 {
    DVec2::from_angle(bearing.to_radians()).rotate(offset)
}

fn zoom_around(current: &CameraPosition, focus: DVec2, viewport: DVec2, amount: f64) -> LatLng {
    let center = project(current.target, current.zoom);
    let anchor = center + screen_to_world(focus - viewport / 2.0, current.bearing);
    let moved = anchor + (center - anchor) / amount.exp2();
    unproject(moved, current.zoom)
}

fn fit_bounds(
    bounds: &LatLngBounds,
    padding: f64,
    viewport: DVec2,
) -> Result<CameraPosition, MapError> {
    if padding < 0.0 {
        return Err(MapError::InvalidCameraUpdate(format!(
            "negative padding {padding}"
        )));
    }
    let available = viewport - DVec2::splat(2.0 * padding);
    if available.x <= 0.0 || available.y <= 0.0 {
        return Err(MapError::InvalidCameraUpdate(format!(
            "padding {padding} leaves no room in a {}x{} viewport",
            viewport.x, viewport.y
        )));
    }

    let southwest = project(bounds.southwest(), MIN_ZOOM);
    let northeast = project(bounds.northeast(), MIN_ZOOM);
    let mut span = DVec2::new(northeast.x - southwest.x, southwest.y - northeast.y);
    if bounds.crosses_antimeridian() {
        span.x += TILE_SIZE;
    }
    let center = DVec2::new(southwest.x + span.x / 2.0, northeast.y + span.y / 2.0);

    let fit = |room: f64, extent: f64| {
        if extent > 0.0 {
            (room / extent).log2()
        } else {
            f64::INFINITY
        }
    };
    let zoom = fit(available.x, span.x).min(fit(available.y, span.y));
    let zoom = if zoom.is_finite() { zoom } else { MAX_ZOOM };

    Ok(CameraPosition::new(unproject(center, MIN_ZOOM), zoom))
}
