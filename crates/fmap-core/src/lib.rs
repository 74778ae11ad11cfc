//! fmap Core
//!
//! Shared vocabulary for the map bridge:
//! - Geographic primitives (coordinates, bounds, view frames)
//! - Camera positions and camera-update descriptors
//! - Map-level settings and style descriptors
//! - Overlay presentation options
//! - The native map engine capability, plus a headless in-memory engine
//!
//! Everything here is single-threaded. Engines are shared between a surface
//! controller and its overlay controllers through [`SharedEngine`].

mod camera;
mod engine;
mod error;
mod geo;
mod headless;
mod overlay;
mod settings;
mod style;

pub use camera::{CameraPosition, CameraUpdate, MAX_ZOOM, MIN_ZOOM};
pub use engine::{
    EngineEvent, EngineProvider, Gesture, MapEngine, Permission, RenderedFrame, SharedEngine,
};
pub use error::MapError;
pub use geo::{Frame, LatLng, LatLngBounds, ViewId};
pub use headless::{HeadlessEngine, HeadlessProvider};
pub use overlay::{
    Anchor, InfoWindow, MarkerIcon, MarkerOptions, MarkerPatch, NativeOverlay, OverlayHandle,
    OverlayKind, PolylineOptions, PolylinePatch,
};
pub use settings::{MapSettings, MapType, TargetBounds, ZoomRange};
pub use style::{MapStyle, StyleError, StyleRule};
