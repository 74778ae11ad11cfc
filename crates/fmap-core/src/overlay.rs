//! Overlay presentation options and native overlay descriptions.

use crate::error::MapError;
use crate::geo::LatLng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Engine-assigned handle of one attached native overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub u64);

impl fmt::Display for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The overlay namespaces of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Marker,
    Polyline,
}

impl OverlayKind {
    /// Prefix of identifiers minted for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Marker => "m",
            Self::Polyline => "p",
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker => write!(f, "marker"),
            Self::Polyline => write!(f, "polyline"),
        }
    }
}

/// Normalized point within an image, `(0, 0)` top-left to `(1, 1)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Anchor {
    pub u: f64,
    pub v: f64,
}

impl Anchor {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    fn validate(&self, field: &'static str) -> Result<(), MapError> {
        let unit = 0.0..=1.0;
        if unit.contains(&self.u) && unit.contains(&self.v) {
            Ok(())
        } else {
            Err(MapError::range(
                field,
                format!("({}, {}) is outside the unit square", self.u, self.v),
            ))
        }
    }
}

impl From<(f64, f64)> for Anchor {
    fn from((u, v): (f64, f64)) -> Self {
        Self::new(u, v)
    }
}

impl From<Anchor> for (f64, f64) {
    fn from(value: Anchor) -> Self {
        (value.u, value.v)
    }
}

/// Marker bitmap.
///
/// Crosses the bridge as `["defaultMarker"]`, `["defaultMarker", hue]`,
/// `["fromAsset", name]` or `["fromAsset", name, package]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub enum MarkerIcon {
    #[default]
    Default,
    DefaultHue(f64),
    Asset {
        name: String,
        package: Option<String>,
    },
}

impl TryFrom<Vec<Value>> for MarkerIcon {
    type Error = String;

    fn try_from(value: Vec<Value>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [Value::String(tag)] if tag == "defaultMarker" => Ok(Self::Default),
            [Value::String(tag), hue] if tag == "defaultMarker" => hue
                .as_f64()
                .map(Self::DefaultHue)
                .ok_or_else(|| format!("marker hue must be a number, got {hue}")),
            [Value::String(tag), Value::String(name)] if tag == "fromAsset" => Ok(Self::Asset {
                name: name.clone(),
                package: None,
            }),
            [Value::String(tag), Value::String(name), Value::String(package)]
                if tag == "fromAsset" =>
            {
                Ok(Self::Asset {
                    name: name.clone(),
                    package: Some(package.clone()),
                })
            }
            other => Err(format!("unsupported marker icon {other:?}")),
        }
    }
}

impl From<MarkerIcon> for Vec<Value> {
    fn from(value: MarkerIcon) -> Self {
        match value {
            MarkerIcon::Default => vec![Value::from("defaultMarker")],
            MarkerIcon::DefaultHue(hue) => vec![Value::from("defaultMarker"), Value::from(hue)],
            MarkerIcon::Asset { name, package } => {
                let mut out = vec![Value::from("fromAsset"), Value::from(name)];
                out.extend(package.map(Value::from));
                out
            }
        }
    }
}

/// Text bubble shown when a marker is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoWindow {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub anchor: Anchor,
}

impl Default for InfoWindow {
    fn default() -> Self {
        Self {
            title: None,
            snippet: None,
            anchor: Anchor::new(0.5, 0.0),
        }
    }
}

/// Complete presentation state of one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerOptions {
    pub position: LatLng,
    pub alpha: f64,
    pub anchor: Anchor,
    pub consume_tap_events: bool,
    pub draggable: bool,
    pub flat: bool,
    pub icon: MarkerIcon,
    pub info_window: InfoWindow,
    /// Degrees clockwise, kept in `[0, 360)`.
    pub rotation: f64,
    pub visible: bool,
    pub z_index: f64,
}

impl MarkerOptions {
    /// Default presentation at `position`.
    pub fn at(position: LatLng) -> Self {
        Self {
            position,
            alpha: 1.0,
            anchor: Anchor::new(0.5, 1.0),
            consume_tap_events: false,
            draggable: false,
            flat: false,
            icon: MarkerIcon::Default,
            info_window: InfoWindow::default(),
            rotation: 0.0,
            visible: true,
            z_index: 0.0,
        }
    }

    /// Validate every field and wrap rotation into `[0, 360)`.
    pub fn normalized(mut self) -> Result<Self, MapError> {
        self.position.validate()?;
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(MapError::range("alpha", format!("{} is outside [0, 1]", self.alpha)));
        }
        self.anchor.validate("anchor")?;
        self.info_window.anchor.validate("info window anchor")?;
        if let MarkerIcon::DefaultHue(hue) = self.icon {
            if !(0.0..360.0).contains(&hue) {
                return Err(MapError::range("hue", format!("{hue} is outside [0, 360)")));
            }
        }
        if !self.rotation.is_finite() {
            return Err(MapError::range("rotation", format!("{} is not an angle", self.rotation)));
        }
        if !self.z_index.is_finite() {
            return Err(MapError::range("z-index", format!("{} is not finite", self.z_index)));
        }
        self.rotation = self.rotation.rem_euclid(360.0);
        Ok(self)
    }
}

/// Partial marker update as sent by the UI layer; absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerPatch {
    pub alpha: Option<f64>,
    pub anchor: Option<Anchor>,
    pub consume_tap_events: Option<bool>,
    pub draggable: Option<bool>,
    pub flat: Option<bool>,
    pub icon: Option<MarkerIcon>,
    pub info_window_anchor: Option<Anchor>,
    pub info_window_text: Option<(Option<String>, Option<String>)>,
    pub position: Option<LatLng>,
    pub rotation: Option<f64>,
    pub visible: Option<bool>,
    pub z_index: Option<f64>,
}

impl MarkerPatch {
    /// The options that result from applying this patch to `base`.
    pub fn apply_to(&self, base: &MarkerOptions) -> Result<MarkerOptions, MapError> {
        let mut next = base.clone();
        if let Some(alpha) = self.alpha {
            next.alpha = alpha;
        }
        if let Some(anchor) = self.anchor {
            next.anchor = anchor;
        }
        if let Some(consume) = self.consume_tap_events {
            next.consume_tap_events = consume;
        }
        if let Some(draggable) = self.draggable {
            next.draggable = draggable;
        }
        if let Some(flat) = self.flat {
            next.flat = flat;
        }
        if let Some(icon) = &self.icon {
            next.icon = icon.clone();
        }
        if let Some(anchor) = self.info_window_anchor {
            next.info_window.anchor = anchor;
        }
        if let Some((title, snippet)) = &self.info_window_text {
            next.info_window.title = title.clone();
            next.info_window.snippet = snippet.clone();
        }
        if let Some(position) = self.position {
            next.position = position;
        }
        if let Some(rotation) = self.rotation {
            next.rotation = rotation;
        }
        if let Some(visible) = self.visible {
            next.visible = visible;
        }
        if let Some(z_index) = self.z_index {
            next.z_index = z_index;
        }
        next.normalized()
    }
}

/// Complete presentation state of one polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolylineOptions {
    pub points: Vec<LatLng>,
    /// Stroke width in logical pixels.
    pub width: f64,
    /// ARGB color.
    pub color: u32,
    pub geodesic: bool,
    pub visible: bool,
    pub z_index: f64,
    pub clickable: bool,
}

impl PolylineOptions {
    /// Default presentation along `points`.
    pub fn along(points: Vec<LatLng>) -> Self {
        Self {
            points,
            width: 10.0,
            color: 0xFF00_0000,
            geodesic: false,
            visible: true,
            z_index: 0.0,
            clickable: false,
        }
    }

    pub fn validate(&self) -> Result<(), MapError> {
        validate_path(&self.points)?;
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(MapError::range("width", format!("{} is not a positive width", self.width)));
        }
        if !self.z_index.is_finite() {
            return Err(MapError::range("z-index", format!("{} is not finite", self.z_index)));
        }
        Ok(())
    }
}

/// A drawable path needs two finite points.
pub(crate) fn validate_path(points: &[LatLng]) -> Result<(), MapError> {
    if points.len() < 2 {
        return Err(MapError::InvalidPath {
            points: points.len(),
        });
    }
    for point in points {
        point.validate()?;
    }
    Ok(())
}

/// Partial polyline update; absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolylinePatch {
    pub points: Option<Vec<LatLng>>,
    pub width: Option<f64>,
    pub color: Option<u32>,
    pub geodesic: Option<bool>,
    pub visible: Option<bool>,
    pub z_index: Option<f64>,
    pub clickable: Option<bool>,
}

impl PolylinePatch {
    pub fn apply_to(&self, base: &PolylineOptions) -> Result<PolylineOptions, MapError> {
        let mut next = base.clone();
        if let Some(points) = &self.points {
            next.points = points.clone();
        }
        if let Some(width) = self.width {
            next.width = width;
        }
        if let Some(color) = self.color {
            next.color = color;
        }
        if let Some(geodesic) = self.geodesic {
            next.geodesic = geodesic;
        }
        if let Some(visible) = self.visible {
            next.visible = visible;
        }
        if let Some(z_index) = self.z_index {
            next.z_index = z_index;
        }
        if let Some(clickable) = self.clickable {
            next.clickable = clickable;
        }
        next.validate()?;
        Ok(next)
    }
}

/// What the engine draws for one overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeOverlay {
    Marker(MarkerOptions),
    Polyline(PolylineOptions),
}

impl NativeOverlay {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::Marker(_) => OverlayKind::Marker,
            Self::Polyline(_) => OverlayKind::Polyline,
        }
    }
}
