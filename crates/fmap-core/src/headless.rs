//! Headless in-memory map engine.
//!
//! Keeps the state a native map view would hold and simulates camera
//! animations on a caller-driven clock. Used by the host when no platform
//! engine is linked, and by tests to inspect what reached the native side.

use crate::camera::{CameraPosition, MAX_ZOOM, MIN_ZOOM};
use crate::engine::{
    EngineEvent, EngineProvider, Gesture, MapEngine, Permission, RenderedFrame, SharedEngine,
};
use crate::error::MapError;
use crate::geo::{Frame, LatLng, LatLngBounds};
use crate::overlay::{NativeOverlay, OverlayHandle};
use crate::settings::MapType;
use crate::style::MapStyle;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// A camera animation in flight.
#[derive(Debug, Clone, Copy)]
struct Animation {
    from: CameraPosition,
    to: CameraPosition,
    duration: Duration,
    elapsed: Duration,
}

/// In-memory stand-in for a native map view.
#[derive(Debug)]
pub struct HeadlessEngine {
    camera: CameraPosition,
    animation: Option<Animation>,
    overlays: BTreeMap<OverlayHandle, NativeOverlay>,
    next_handle: u64,
    target_bounds: Option<LatLngBounds>,
    compass_enabled: bool,
    map_type: MapType,
    style: Option<MapStyle>,
    zoom_limits: (f64, f64),
    disabled_gestures: HashSet<Gesture>,
    my_location_layer: bool,
    granted: HashSet<Permission>,
    frame: Frame,
    hidden: bool,
    frames_rendered: u64,
    pending: Vec<EngineEvent>,
}

impl HeadlessEngine {
    /// Create an engine showing `camera`.
    pub fn new(camera: CameraPosition) -> Self {
        Self {
            camera,
            animation: None,
            overlays: BTreeMap::new(),
            next_handle: 1,
            target_bounds: None,
            compass_enabled: true,
            map_type: MapType::Normal,
            style: None,
            zoom_limits: (MIN_ZOOM, MAX_ZOOM),
            disabled_gestures: HashSet::new(),
            my_location_layer: false,
            granted: HashSet::new(),
            frame: Frame::default(),
            hidden: false,
            frames_rendered: 0,
            pending: Vec::new(),
        }
    }

    /// Wrap into a shareable handle.
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Simulate the user granting a permission.
    pub fn grant_permission(&mut self, permission: Permission) {
        if self.granted.insert(permission) {
            self.pending.push(EngineEvent::PermissionChanged {
                permission,
                granted: true,
            });
        }
    }

    /// Simulate the user revoking a permission.
    pub fn revoke_permission(&mut self, permission: Permission) {
        if self.granted.remove(&permission) {
            self.pending.push(EngineEvent::PermissionChanged {
                permission,
                granted: false,
            });
        }
    }

    /// Simulate a tap on an attached overlay. Returns `false` if nothing is attached there.
    pub fn tap(&mut self, handle: OverlayHandle) -> bool {
        if !self.overlays.contains_key(&handle) {
            return false;
        }
        self.pending.push(EngineEvent::OverlayTapped(handle));
        true
    }

    /// Simulate the user dragging a marker to `position`.
    pub fn drag_marker(&mut self, handle: OverlayHandle, position: LatLng) -> bool {
        match self.overlays.get_mut(&handle) {
            Some(NativeOverlay::Marker(marker)) => {
                marker.position = position;
                self.pending
                    .push(EngineEvent::MarkerDragEnded { handle, position });
                true
            }
            _ => false,
        }
    }

    pub fn overlay(&self, handle: OverlayHandle) -> Option<&NativeOverlay> {
        self.overlays.get(&handle)
    }

    pub fn target_bounds(&self) -> Option<LatLngBounds> {
        self.target_bounds
    }

    pub fn compass_enabled(&self) -> bool {
        self.compass_enabled
    }

    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    pub fn style(&self) -> Option<&MapStyle> {
        self.style.as_ref()
    }

    pub fn zoom_limits(&self) -> (f64, f64) {
        self.zoom_limits
    }

    pub fn gesture_enabled(&self, gesture: Gesture) -> bool {
        !self.disabled_gestures.contains(&gesture)
    }

    pub fn my_location_layer_visible(&self) -> bool {
        self.my_location_layer
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl MapEngine for HeadlessEngine {
    fn camera(&self) -> CameraPosition {
        self.camera
    }

    fn move_camera(&mut self, position: CameraPosition) {
        self.animation = None;
        self.camera = position;
        self.pending.push(EngineEvent::CameraIdle(position));
    }

    fn animate_camera(&mut self, position: CameraPosition, duration: Duration) {
        self.animation = Some(Animation {
            from: self.camera,
            to: position,
            duration,
            elapsed: Duration::ZERO,
        });
    }

    fn animation_target(&self) -> Option<CameraPosition> {
        self.animation.map(|animation| animation.to)
    }

    fn attach_overlay(&mut self, overlay: NativeOverlay) -> OverlayHandle {
        let handle = OverlayHandle(self.next_handle);
        self.next_handle += 1;
        debug!("Attached {} overlay {}", overlay.kind(), handle);
        self.overlays.insert(handle, overlay);
        handle
    }

    fn update_overlay(&mut self, handle: OverlayHandle, overlay: NativeOverlay) {
        match self.overlays.get_mut(&handle) {
            Some(slot) => *slot = overlay,
            None => warn!("Update for unknown overlay {}", handle),
        }
    }

    fn detach_overlay(&mut self, handle: OverlayHandle) {
        if self.overlays.remove(&handle).is_none() {
            warn!("Detach of unknown overlay {}", handle);
        }
    }

    fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    fn set_camera_target_bounds(&mut self, bounds: Option<LatLngBounds>) {
        self.target_bounds = bounds;
    }

    fn set_compass_enabled(&mut self, enabled: bool) {
        self.compass_enabled = enabled;
    }

    fn set_map_type(&mut self, map_type: MapType) {
        self.map_type = map_type;
    }

    fn apply_style(&mut self, style: Option<&MapStyle>) {
        self.style = style.cloned();
    }

    fn set_zoom_limits(&mut self, min: f64, max: f64) {
        self.zoom_limits = (min, max);
    }

    fn set_gesture_enabled(&mut self, gesture: Gesture, enabled: bool) {
        if enabled {
            self.disabled_gestures.remove(&gesture);
        } else {
            self.disabled_gestures.insert(gesture);
        }
    }

    fn set_my_location_layer(&mut self, visible: bool) {
        self.my_location_layer = visible;
    }

    fn query_permission(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }

    fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn render_frame(&mut self) -> RenderedFrame {
        self.frames_rendered += 1;
        RenderedFrame {
            camera: self.camera,
            overlays: self.overlays.len(),
            visible: !self.hidden,
        }
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<EngineEvent> {
        if let Some(mut animation) = self.animation.take() {
            animation.elapsed += elapsed;
            if animation.elapsed >= animation.duration {
                self.camera = animation.to;
                self.pending.push(EngineEvent::CameraIdle(animation.to));
            } else {
                let t = animation.elapsed.as_secs_f64() / animation.duration.as_secs_f64();
                self.camera = animation.from.interpolate(&animation.to, t);
                self.animation = Some(animation);
            }
        }
        std::mem::take(&mut self.pending)
    }
}

/// Builds [`HeadlessEngine`]s, refusing to start without an API key.
#[derive(Debug, Clone)]
pub struct HeadlessProvider {
    api_key: Option<String>,
    default_camera: CameraPosition,
    location_granted: bool,
}

impl HeadlessProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            default_camera: CameraPosition::default(),
            location_granted: false,
        }
    }

    /// Camera every new engine starts at.
    pub fn with_default_camera(mut self, camera: CameraPosition) -> Self {
        self.default_camera = camera;
        self
    }

    /// Whether new engines start with the location permission.
    pub fn with_location_permission(mut self, granted: bool) -> Self {
        self.location_granted = granted;
        self
    }
}

impl EngineProvider for HeadlessProvider {
    fn create_engine(&self, frame: Frame) -> Result<SharedEngine, MapError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => return Err(MapError::Initialization("missing API key".into())),
        }
        let mut engine = HeadlessEngine::new(self.default_camera);
        engine.set_frame(frame);
        if self.location_granted {
            engine.granted.insert(Permission::Location);
        }
        let shared: SharedEngine = Rc::new(RefCell::new(engine));
        Ok(shared)
    }
}
