//! The native map engine capability.
//!
//! A surface controller drives exactly one engine. The engine is assumed
//! reliable: every argument it receives has already been validated, so none
//! of its operations fail. Events the engine raises on its own (camera
//! settling, taps, drags) are collected by [`MapEngine::advance`].

use crate::camera::CameraPosition;
use crate::error::MapError;
use crate::geo::{Frame, LatLng, LatLngBounds};
use crate::overlay::{NativeOverlay, OverlayHandle};
use crate::settings::MapType;
use crate::style::MapStyle;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// An engine shared between a surface and the overlay controllers it owns.
///
/// Surfaces live on the host's UI thread; nothing here is `Send`.
pub type SharedEngine = Rc<RefCell<dyn MapEngine>>;

/// Runtime permissions the engine may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Location,
}

/// User gestures the map can respond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Rotate,
    Scroll,
    Tilt,
    Zoom,
}

/// Events raised by the engine between commands.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A camera movement finished, instantaneous or animated.
    CameraIdle(CameraPosition),
    /// The user tapped an overlay.
    OverlayTapped(OverlayHandle),
    /// The user finished dragging a marker to `position`.
    MarkerDragEnded {
        handle: OverlayHandle,
        position: LatLng,
    },
    /// A runtime permission was granted or revoked.
    PermissionChanged { permission: Permission, granted: bool },
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedFrame {
    pub camera: CameraPosition,
    pub overlays: usize,
    pub visible: bool,
}

/// Operations a native map view must provide.
pub trait MapEngine {
    /// Live camera, mid-animation if one is running.
    fn camera(&self) -> CameraPosition;

    /// Jump to `position`, cancelling any running animation.
    fn move_camera(&mut self, position: CameraPosition);

    /// Move to `position` over `duration`, replacing any running animation.
    fn animate_camera(&mut self, position: CameraPosition, duration: Duration);

    /// Where the running animation will land, if one is running.
    fn animation_target(&self) -> Option<CameraPosition>;

    fn attach_overlay(&mut self, overlay: NativeOverlay) -> OverlayHandle;

    fn update_overlay(&mut self, handle: OverlayHandle, overlay: NativeOverlay);

    fn detach_overlay(&mut self, handle: OverlayHandle);

    /// Number of attached overlays of every kind.
    fn overlay_count(&self) -> usize;

    fn set_camera_target_bounds(&mut self, bounds: Option<LatLngBounds>);

    fn set_compass_enabled(&mut self, enabled: bool);

    fn set_map_type(&mut self, map_type: MapType);

    /// Apply a validated style, or restore the default style with `None`.
    fn apply_style(&mut self, style: Option<&MapStyle>);

    fn set_zoom_limits(&mut self, min: f64, max: f64);

    fn set_gesture_enabled(&mut self, gesture: Gesture, enabled: bool);

    fn set_my_location_layer(&mut self, visible: bool);

    fn query_permission(&self, permission: Permission) -> bool;

    fn set_frame(&mut self, frame: Frame);

    fn set_hidden(&mut self, hidden: bool);

    /// Draw the current camera and overlay set.
    fn render_frame(&mut self) -> RenderedFrame;

    /// Let `elapsed` pass and collect the events raised meanwhile.
    fn advance(&mut self, elapsed: Duration) -> Vec<EngineEvent>;
}

/// Creates native map engines for new surfaces.
pub trait EngineProvider {
    /// Build an engine for a view occupying `frame`.
    ///
    /// Fails with [`MapError::Initialization`] when the native map cannot be
    /// constructed, for example without credentials.
    fn create_engine(&self, frame: Frame) -> Result<SharedEngine, MapError>;
}
