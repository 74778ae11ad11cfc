//! Method-call bridge between the UI layer and the host.
//!
//! Calls arrive as `{ "viewId": 1, "method": "marker#add", "arguments": {...} }`
//! and produce a JSON reply. Argument encodings follow the platform map
//! plugin conventions: coordinates are `[lat, lng]` pairs, bounds are
//! `[southwest, northeast]`, and camera updates are tagged arrays such as
//! `["newLatLngZoom", [lat, lng], zoom]`.

use crate::host::MapHost;
use fmap_core::{
    CameraPosition, CameraUpdate, Frame, LatLng, LatLngBounds, MapError, MarkerOptions,
    MarkerPatch, PolylineOptions, PolylinePatch, ViewId,
};
use fmap_surface::{CreationParams, CreationRequest, MapOptions, MapSurfaceController, PlatformView};
use glam::DVec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// One request from the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCall {
    pub view_id: ViewId,
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(view_id: ViewId, method: impl Into<String>, arguments: Value) -> Self {
        Self {
            view_id,
            method: method.into(),
            arguments,
        }
    }
}

/// Bridge errors
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Unknown view: {0}")]
    UnknownView(ViewId),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Undecodable arguments: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Map(#[from] MapError),
}

impl BridgeError {
    /// Stable error code reported to the UI layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownView(_) => "UnknownViewError",
            Self::UnknownMethod(_) => "UnknownMethodError",
            Self::InvalidArguments(_) | Self::Decode(_) => "InvalidArgumentsError",
            Self::Map(e) => e.code(),
        }
    }
}

/// Wrap a dispatch result into the reply sent back to the UI layer.
pub fn encode_reply(result: &Result<Value, BridgeError>) -> Value {
    match result {
        Ok(value) => json!({ "ok": value }),
        Err(e) => json!({ "error": { "code": e.code(), "message": e.to_string() } }),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateArgs {
    frame: Frame,
    #[serde(default)]
    params: CreationParams,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ShowArgs {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkerArgs {
    marker_id: String,
    #[serde(flatten)]
    patch: MarkerPatch,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolylineArgs {
    polyline_id: String,
    #[serde(flatten)]
    patch: PolylinePatch,
}

impl MapHost {
    /// Run one call against the addressed surface.
    pub fn dispatch(&mut self, call: MethodCall) -> Result<Value, BridgeError> {
        let MethodCall {
            view_id,
            method,
            arguments,
        } = call;
        debug!("Dispatching {} to {}", method, view_id);

        match method.as_str() {
            "map#create" => {
                let args: CreateArgs = decode(arguments)?;
                let created = self.create_surface(CreationRequest {
                    frame: args.frame,
                    view_id,
                    params: args.params,
                })?;
                return Ok(json!(created));
            }
            "map#dispose" => {
                return if self.destroy_surface(view_id) {
                    Ok(Value::Null)
                } else {
                    Err(self.missing(view_id))
                };
            }
            _ => {}
        }

        let Some(surface) = self.surfaces.get_mut(&view_id) else {
            return Err(self.missing(view_id));
        };
        let result = dispatch_to_surface(surface, &method, arguments);
        if let Err(e) = &result {
            warn!("{} on {} failed: {}", method, view_id, e);
        }
        result
    }

    /// A destroyed surface reports `Disposed`; an id never seen is unknown.
    fn missing(&self, view_id: ViewId) -> BridgeError {
        if self.retired.contains(&view_id) {
            BridgeError::Map(MapError::Disposed(view_id))
        } else {
            BridgeError::UnknownView(view_id)
        }
    }
}

fn dispatch_to_surface(
    surface: &mut MapSurfaceController,
    method: &str,
    arguments: Value,
) -> Result<Value, BridgeError> {
    let reply = match method {
        "map#show" => {
            let args: ShowArgs = if arguments.is_null() {
                ShowArgs::default()
            } else {
                decode(arguments)?
            };
            surface.show(args.x, args.y)?;
            Value::Null
        }
        "map#hide" => {
            surface.hide()?;
            Value::Null
        }
        "map#update" => {
            let options: MapOptions = decode(arguments)?;
            surface.update_options(&options)?;
            to_json(&surface.camera_position())?
        }
        "map#settings" => to_json(surface.settings())?,
        "camera#move" => {
            surface.move_camera(&decode_camera_update(&arguments)?)?;
            Value::Null
        }
        "camera#animate" => {
            surface.animate_camera(&decode_camera_update(&arguments)?)?;
            Value::Null
        }
        "camera#position" => to_json(&surface.camera_position())?,
        "marker#add" => {
            let patch: MarkerPatch = decode(arguments)?;
            let position = patch
                .position
                .ok_or_else(|| BridgeError::InvalidArguments("marker#add needs a position".into()))?;
            let options = patch.apply_to(&MarkerOptions::at(position))?;
            json!(surface.add_marker_with(options)?)
        }
        "marker#update" => {
            let args: MarkerArgs = decode(arguments)?;
            surface.marker_mut(&args.marker_id)?.apply(&args.patch)?;
            Value::Null
        }
        "marker#remove" => {
            let args: MarkerArgs = decode(arguments)?;
            surface.remove_marker(&args.marker_id)?;
            Value::Null
        }
        "marker#options" => {
            let args: MarkerArgs = decode(arguments)?;
            to_json(surface.marker(&args.marker_id)?.options())?
        }
        "polyline#add" => {
            let patch: PolylinePatch = decode(arguments)?;
            let points = patch
                .points
                .clone()
                .ok_or_else(|| BridgeError::InvalidArguments("polyline#add needs points".into()))?;
            let options = patch.apply_to(&PolylineOptions::along(points))?;
            json!(surface.add_polyline_with(options)?)
        }
        "polyline#update" => {
            let args: PolylineArgs = decode(arguments)?;
            surface.polyline_mut(&args.polyline_id)?.apply(&args.patch)?;
            Value::Null
        }
        "polyline#remove" => {
            let args: PolylineArgs = decode(arguments)?;
            surface.remove_polyline(&args.polyline_id)?;
            Value::Null
        }
        "polyline#options" => {
            let args: PolylineArgs = decode(arguments)?;
            to_json(surface.polyline(&args.polyline_id)?.options())?
        }
        other => return Err(BridgeError::UnknownMethod(other.to_string())),
    };
    Ok(reply)
}

fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, BridgeError> {
    Ok(serde_json::from_value(arguments)?)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, BridgeError> {
    Ok(serde_json::to_value(value)?)
}

/// Decode a tagged camera-update array.
///
/// Anything malformed is an invalid camera update, not a bridge error.
pub fn decode_camera_update(value: &Value) -> Result<CameraUpdate, MapError> {
    let parts = value
        .as_array()
        .ok_or_else(|| invalid_update("expected a tagged array"))?;
    let tag = parts
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_update("missing update tag"))?;

    let update = match (tag, parts.len()) {
        ("newCameraPosition", 2) => CameraUpdate::NewCameraPosition(part::<CameraPosition>(parts, 1)?),
        ("newLatLng", 2) => CameraUpdate::NewLatLng(part::<LatLng>(parts, 1)?),
        ("newLatLngZoom", 3) => {
            CameraUpdate::NewLatLngZoom(part::<LatLng>(parts, 1)?, part::<f64>(parts, 2)?)
        }
        ("newLatLngBounds", 3) => CameraUpdate::NewLatLngBounds {
            bounds: part::<LatLngBounds>(parts, 1)?,
            padding: part::<f64>(parts, 2)?,
        },
        ("scrollBy", 3) => CameraUpdate::ScrollBy {
            dx: part::<f64>(parts, 1)?,
            dy: part::<f64>(parts, 2)?,
        },
        ("zoomBy", 2) => CameraUpdate::ZoomBy {
            amount: part::<f64>(parts, 1)?,
            focus: None,
        },
        ("zoomBy", 3) => CameraUpdate::ZoomBy {
            amount: part::<f64>(parts, 1)?,
            focus: Some(DVec2::from(part::<[f64; 2]>(parts, 2)?)),
        },
        ("zoomIn", 1) => CameraUpdate::ZoomIn,
        ("zoomOut", 1) => CameraUpdate::ZoomOut,
        ("zoomTo", 2) => CameraUpdate::ZoomTo(part::<f64>(parts, 1)?),
        (tag, len) => {
            return Err(invalid_update(&format!("unknown update {tag} with {len} parts")));
        }
    };
    Ok(update)
}

fn part<T: DeserializeOwned>(parts: &[Value], index: usize) -> Result<T, MapError> {
    let value = parts.get(index).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| invalid_update(&format!("part {index}: {e}")))
}

fn invalid_update(reason: &str) -> MapError {
    MapError::InvalidCameraUpdate(reason.to_string())
}
