//! Map surface controller.

use crate::event::MapEvent;
use crate::factory::CreationRequest;
use crate::options::{CreationParams, MapOptions};
use crate::sink::{MapOptionsSink, PlatformView};
use crossbeam_channel::Sender;
use fmap_core::{
    CameraPosition, CameraUpdate, EngineEvent, Frame, Gesture, LatLng, LatLngBounds, MapError,
    MapSettings, MapStyle, MapType, MarkerOptions, Permission, PolylineOptions, RenderedFrame,
    SharedEngine, TargetBounds, ViewId, ZoomRange,
};
use fmap_overlays::{
    IdentifierRegistry, MarkerController, OverlayController, OverlayId, PolylineController,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of a surface once construction succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Built but never shown.
    Created,
    Shown,
    Hidden,
    /// Terminal; the native map and every overlay are released.
    Destroyed,
}

/// Owns one native map, its overlay registries and its settings.
///
/// Runs on the host's UI thread; commands arrive one at a time. Every
/// operation after [`destroy`](Self::destroy) fails with
/// [`MapError::Disposed`].
pub struct MapSurfaceController {
    view_id: ViewId,
    frame: Frame,
    state: SurfaceState,
    /// `None` once destroyed.
    engine: Option<SharedEngine>,
    settings: MapSettings,
    my_location_visible: bool,
    markers: IdentifierRegistry<MarkerController>,
    polylines: IdentifierRegistry<PolylineController>,
    events: Sender<MapEvent>,
    animation_duration: Duration,
    /// Camera reported after the engine is gone.
    last_camera: CameraPosition,
}

impl MapSurfaceController {
    /// Build a surface around `engine` and apply the initial arguments.
    ///
    /// Options absent from the request keep the engine's defaults.
    pub fn create(
        request: CreationRequest,
        engine: SharedEngine,
        events: Sender<MapEvent>,
        animation_duration: Duration,
    ) -> Result<Self, MapError> {
        let CreationRequest {
            frame,
            view_id,
            params,
        } = request;

        {
            let mut native = engine.borrow_mut();
            native.set_frame(frame);
            native.set_hidden(true);
        }
        let last_camera = engine.borrow().camera();

        let mut surface = Self {
            view_id,
            frame,
            state: SurfaceState::Created,
            engine: Some(engine),
            settings: MapSettings::default(),
            my_location_visible: false,
            markers: IdentifierRegistry::new(),
            polylines: IdentifierRegistry::new(),
            events,
            animation_duration,
            last_camera,
        };
        if let Err(e) = surface.apply_initial(params) {
            warn!("Map surface {} rejected its initial arguments: {}", view_id, e);
            // Never created, so nothing to tear down on drop
            surface.engine = None;
            surface.state = SurfaceState::Destroyed;
            return Err(e);
        }

        info!("Created map surface {}", view_id);
        Ok(surface)
    }

    fn apply_initial(&mut self, params: CreationParams) -> Result<(), MapError> {
        self.update_options(&params.options)?;
        if let Some(position) = params.initial_camera_position {
            self.move_camera(&CameraUpdate::NewCameraPosition(position))?;
        }
        Ok(())
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == SurfaceState::Destroyed
    }

    /// Settings currently in effect.
    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// Whether the location layer is actually drawn, which needs both the
    /// setting and the location permission.
    pub fn my_location_visible(&self) -> bool {
        self.my_location_visible
    }

    /// Apply a partial option set.
    ///
    /// The whole set is validated before any of it is applied, so a bad style
    /// or zoom range leaves every option untouched.
    pub fn update_options(&mut self, options: &MapOptions) -> Result<(), MapError> {
        let engine = self.live_engine()?;

        let style = match &options.map_style {
            Some(Some(source)) => Some(Some(MapStyle::parse(source)?)),
            Some(None) => Some(None),
            None => None,
        };
        let zoom_range = options
            .min_max_zoom_preference
            .map(ZoomRange::validate)
            .transpose()?;

        if let Some(TargetBounds(bounds)) = options.camera_target_bounds {
            self.apply_target_bounds(&engine, bounds);
        }
        if let Some(enabled) = options.compass_enabled {
            self.apply_compass(&engine, enabled);
        }
        if let Some(map_type) = options.map_type {
            self.apply_map_type(&engine, map_type);
        }
        if let Some(style) = style {
            self.apply_style(&engine, style);
        }
        if let Some(range) = zoom_range {
            self.apply_zoom_range(&engine, range);
        }
        let gestures = [
            (Gesture::Rotate, options.rotate_gestures_enabled),
            (Gesture::Scroll, options.scroll_gestures_enabled),
            (Gesture::Tilt, options.tilt_gestures_enabled),
            (Gesture::Zoom, options.zoom_gestures_enabled),
        ];
        for (gesture, enabled) in gestures {
            if let Some(enabled) = enabled {
                self.apply_gesture(&engine, gesture, enabled);
            }
        }
        if let Some(enabled) = options.track_camera_position {
            self.settings.track_camera_position = enabled;
        }
        if let Some(enabled) = options.my_location_enabled {
            self.apply_my_location(&engine, enabled);
        }
        debug!("Surface {} options updated", self.view_id);
        Ok(())
    }

    /// Jump the camera without animation.
    pub fn move_camera(&mut self, update: &CameraUpdate) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        let target = self.resolve_camera(&engine, update)?;
        debug!("Surface {} camera -> {:?}", self.view_id, target);
        engine.borrow_mut().move_camera(target);
        Ok(())
    }

    /// Start an animated camera change and return immediately.
    pub fn animate_camera(&mut self, update: &CameraUpdate) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        let target = self.resolve_camera(&engine, update)?;
        debug!(
            "Surface {} animating camera -> {:?} over {:?}",
            self.view_id, target, self.animation_duration
        );
        engine
            .borrow_mut()
            .animate_camera(target, self.animation_duration);
        Ok(())
    }

    /// Live camera; the last known one once destroyed.
    pub fn camera_position(&self) -> CameraPosition {
        match &self.engine {
            Some(engine) => engine.borrow().camera(),
            None => self.last_camera,
        }
    }

    /// Add a marker with default presentation.
    pub fn add_marker(&mut self, position: LatLng) -> Result<OverlayId, MapError> {
        self.add_marker_with(MarkerOptions::at(position))
    }

    pub fn add_marker_with(&mut self, options: MarkerOptions) -> Result<OverlayId, MapError> {
        let engine = self.live_engine()?;
        let marker = MarkerController::attach(engine, options)?;
        let id = self.markers.insert(marker);
        debug!("Surface {} added marker {}", self.view_id, id);
        Ok(id)
    }

    pub fn marker(&self, id: &str) -> Result<&MarkerController, MapError> {
        self.ensure_live()?;
        self.markers.lookup(id)
    }

    pub fn marker_mut(&mut self, id: &str) -> Result<&mut MarkerController, MapError> {
        self.ensure_live()?;
        self.markers.lookup_mut(id)
    }

    /// Detach and forget a marker. Removing an absent id is an error.
    pub fn remove_marker(&mut self, id: &str) -> Result<(), MapError> {
        self.ensure_live()?;
        self.markers.remove(id)?.dispose();
        debug!("Surface {} removed marker {}", self.view_id, id);
        Ok(())
    }

    pub fn marker_ids(&self) -> Vec<OverlayId> {
        self.markers.ids()
    }

    /// Add a polyline with default presentation.
    pub fn add_polyline(&mut self, points: Vec<LatLng>) -> Result<OverlayId, MapError> {
        self.add_polyline_with(PolylineOptions::along(points))
    }

    pub fn add_polyline_with(&mut self, options: PolylineOptions) -> Result<OverlayId, MapError> {
        let engine = self.live_engine()?;
        let polyline = PolylineController::attach(engine, options)?;
        let id = self.polylines.insert(polyline);
        debug!("Surface {} added polyline {}", self.view_id, id);
        Ok(id)
    }

    pub fn polyline(&self, id: &str) -> Result<&PolylineController, MapError> {
        self.ensure_live()?;
        self.polylines.lookup(id)
    }

    pub fn polyline_mut(&mut self, id: &str) -> Result<&mut PolylineController, MapError> {
        self.ensure_live()?;
        self.polylines.lookup_mut(id)
    }

    pub fn remove_polyline(&mut self, id: &str) -> Result<(), MapError> {
        self.ensure_live()?;
        self.polylines.remove(id)?.dispose();
        debug!("Surface {} removed polyline {}", self.view_id, id);
        Ok(())
    }

    pub fn polyline_ids(&self) -> Vec<OverlayId> {
        self.polylines.ids()
    }

    /// Draw the current camera and overlays.
    pub fn render(&mut self) -> Result<RenderedFrame, MapError> {
        let engine = self.live_engine()?;
        let frame = engine.borrow_mut().render_frame();
        Ok(frame)
    }

    /// Advance the engine clock and forward what it raised.
    ///
    /// Returns the number of events sent upward.
    pub fn pump(&mut self, elapsed: Duration) -> usize {
        let Some(engine) = self.engine.clone() else {
            return 0;
        };
        let native_events = engine.borrow_mut().advance(elapsed);

        let mut sent = 0;
        for event in native_events {
            let upward = match event {
                EngineEvent::CameraIdle(position) => {
                    self.settings
                        .track_camera_position
                        .then_some(MapEvent::CameraChanged {
                            view_id: self.view_id,
                            position,
                        })
                }
                EngineEvent::OverlayTapped(handle) => {
                    if let Some(id) = self.markers.id_for_handle(handle) {
                        Some(MapEvent::MarkerTapped {
                            view_id: self.view_id,
                            marker_id: id.clone(),
                        })
                    } else if let Some(id) = self.polylines.id_for_handle(handle) {
                        Some(MapEvent::PolylineTapped {
                            view_id: self.view_id,
                            polyline_id: id.clone(),
                        })
                    } else {
                        debug!("Surface {} tap on unregistered overlay {}", self.view_id, handle);
                        None
                    }
                }
                EngineEvent::MarkerDragEnded { handle, position } => {
                    match self.markers.id_for_handle(handle).cloned() {
                        Some(id) => {
                            if let Ok(marker) = self.markers.lookup_mut(id.as_str()) {
                                marker.sync_position(position);
                            }
                            Some(MapEvent::MarkerDragEnd {
                                view_id: self.view_id,
                                marker_id: id,
                                position,
                            })
                        }
                        None => None,
                    }
                }
                EngineEvent::PermissionChanged {
                    permission,
                    granted,
                } => {
                    debug!(
                        "Surface {} permission {:?} granted={}",
                        self.view_id, permission, granted
                    );
                    None
                }
            };
            if let Some(event) = upward {
                if self.events.send(event).is_ok() {
                    sent += 1;
                }
            }
        }

        // Permission may arrive without an event; re-check every pump.
        self.sync_my_location_layer(&engine);
        sent
    }

    /// Release every overlay and the native map. Calling it again does nothing.
    pub fn destroy(&mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };
        for (_, marker) in self.markers.drain() {
            marker.dispose();
        }
        for (_, polyline) in self.polylines.drain() {
            polyline.dispose();
        }
        {
            let mut native = engine.borrow_mut();
            if self.my_location_visible {
                native.set_my_location_layer(false);
                self.my_location_visible = false;
            }
            native.set_hidden(true);
            self.last_camera = native.camera();
        }
        self.state = SurfaceState::Destroyed;
        info!("Destroyed map surface {}", self.view_id);
    }

    fn ensure_live(&self) -> Result<(), MapError> {
        match self.engine {
            Some(_) => Ok(()),
            None => Err(MapError::Disposed(self.view_id)),
        }
    }

    fn live_engine(&self) -> Result<SharedEngine, MapError> {
        self.engine.clone().ok_or(MapError::Disposed(self.view_id))
    }

    fn resolve_camera(
        &self,
        engine: &SharedEngine,
        update: &CameraUpdate,
    ) -> Result<CameraPosition, MapError> {
        let current = engine.borrow().camera();
        let next = update.resolve_within(&current, self.frame.size(), &self.settings.zoom_range)?;
        Ok(self.constrain(next))
    }

    /// Apply the zoom range and target bounds to a camera.
    fn constrain(&self, mut position: CameraPosition) -> CameraPosition {
        position.zoom = self.settings.zoom_range.clamp(position.zoom);
        if let Some(bounds) = self.settings.camera_target_bounds {
            position.target = bounds.clamp(position.target);
        }
        position
    }

    /// Pull the camera back inside freshly tightened limits.
    fn reclamp_camera(&self, engine: &SharedEngine) {
        let in_flight = engine.borrow().animation_target();
        let current = engine.borrow().camera();
        let clamped = self.constrain(current);
        if clamped != current {
            debug!("Surface {} camera clamped to {:?}", self.view_id, clamped);
            engine.borrow_mut().move_camera(clamped);
        }

        // move_camera cancels the animation; resume it toward a landing inside the limits
        if let Some(target) = in_flight {
            let landing = self.constrain(target);
            if landing != target || clamped != current {
                debug!("Surface {} animation retargeted to {:?}", self.view_id, landing);
                engine
                    .borrow_mut()
                    .animate_camera(landing, self.animation_duration);
            }
        }
    }

    fn apply_target_bounds(&mut self, engine: &SharedEngine, bounds: Option<LatLngBounds>) {
        self.settings.camera_target_bounds = bounds;
        engine.borrow_mut().set_camera_target_bounds(bounds);
        self.reclamp_camera(engine);
    }

    fn apply_compass(&mut self, engine: &SharedEngine, enabled: bool) {
        self.settings.compass_enabled = enabled;
        engine.borrow_mut().set_compass_enabled(enabled);
    }

    fn apply_map_type(&mut self, engine: &SharedEngine, map_type: MapType) {
        self.settings.map_type = map_type;
        engine.borrow_mut().set_map_type(map_type);
    }

    fn apply_style(&mut self, engine: &SharedEngine, style: Option<MapStyle>) {
        engine.borrow_mut().apply_style(style.as_ref());
        self.settings.map_style = style;
    }

    fn apply_zoom_range(&mut self, engine: &SharedEngine, range: ZoomRange) {
        self.settings.zoom_range = range;
        engine
            .borrow_mut()
            .set_zoom_limits(range.lower(), range.upper());
        self.reclamp_camera(engine);
    }

    fn apply_gesture(&mut self, engine: &SharedEngine, gesture: Gesture, enabled: bool) {
        let slot = match gesture {
            Gesture::Rotate => &mut self.settings.rotate_gestures_enabled,
            Gesture::Scroll => &mut self.settings.scroll_gestures_enabled,
            Gesture::Tilt => &mut self.settings.tilt_gestures_enabled,
            Gesture::Zoom => &mut self.settings.zoom_gestures_enabled,
        };
        *slot = enabled;
        engine.borrow_mut().set_gesture_enabled(gesture, enabled);
    }

    fn apply_my_location(&mut self, engine: &SharedEngine, enabled: bool) {
        self.settings.my_location_enabled = enabled;
        self.sync_my_location_layer(engine);
        if enabled && !self.my_location_visible {
            warn!(
                "Surface {}: location permission missing, my-location layer hidden until granted",
                self.view_id
            );
        }
    }

    fn sync_my_location_layer(&mut self, engine: &SharedEngine) {
        let visible = self.settings.my_location_enabled
            && engine.borrow().query_permission(Permission::Location);
        if visible != self.my_location_visible {
            engine.borrow_mut().set_my_location_layer(visible);
            self.my_location_visible = visible;
            debug!("Surface {} my-location layer visible={}", self.view_id, visible);
        }
    }
}

impl MapOptionsSink for MapSurfaceController {
    fn set_camera_target_bounds(&mut self, bounds: Option<LatLngBounds>) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.apply_target_bounds(&engine, bounds);
        Ok(())
    }

    fn set_compass_enabled(&mut self, enabled: bool) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.apply_compass(&engine, enabled);
        Ok(())
    }

    fn set_map_type(&mut self, map_type: MapType) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.apply_map_type(&engine, map_type);
        Ok(())
    }

    fn set_map_style(&mut self, style: Option<&str>) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        let style = style.map(MapStyle::parse).transpose()?;
        self.apply_style(&engine, style);
        Ok(())
    }

    fn set_zoom_range(&mut self, min: Option<f64>, max: Option<f64>) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        let range = ZoomRange::new(min, max)?;
        self.apply_zoom_range(&engine, range);
        Ok(())
    }

    fn set_rotate_gestures_enabled(&mut self, enabled: bool) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.apply_gesture(&engine, Gesture::Rotate, enabled);
        Ok(())
    }

    fn set_scroll_gestures_enabled(&mut self, enabled: bool) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.apply_gesture(&engine, Gesture::Scroll, enabled);
        Ok(())
    }

    fn set_tilt_gestures_enabled(&mut self, enabled: bool) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.apply_gesture(&engine, Gesture::Tilt, enabled);
        Ok(())
    }

    fn set_zoom_gestures_enabled(&mut self, enabled: bool) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.apply_gesture(&engine, Gesture::Zoom, enabled);
        Ok(())
    }

    fn set_track_camera_position(&mut self, enabled: bool) -> Result<(), MapError> {
        self.ensure_live()?;
        self.settings.track_camera_position = enabled;
        Ok(())
    }

    fn set_my_location_enabled(&mut self, enabled: bool) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.apply_my_location(&engine, enabled);
        Ok(())
    }
}

impl PlatformView for MapSurfaceController {
    fn view_id(&self) -> ViewId {
        self.view_id
    }

    fn frame(&self) -> Frame {
        self.frame
    }

    fn show(&mut self, x: f64, y: f64) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        self.frame = self.frame.moved_to(x, y);
        {
            let mut native = engine.borrow_mut();
            native.set_frame(self.frame);
            native.set_hidden(false);
        }
        self.state = SurfaceState::Shown;
        debug!("Surface {} shown at ({}, {})", self.view_id, x, y);
        Ok(())
    }

    fn hide(&mut self) -> Result<(), MapError> {
        let engine = self.live_engine()?;
        engine.borrow_mut().set_hidden(true);
        self.state = SurfaceState::Hidden;
        debug!("Surface {} hidden", self.view_id);
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.state == SurfaceState::Shown
    }
}

impl Drop for MapSurfaceController {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Receiver};
    use fmap_core::{HeadlessEngine, MapEngine, OverlayKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: Frame = Frame {
        x: 0.0,
        y: 0.0,
        width: 400.0,
        height: 300.0,
    };

    struct Fixture {
        surface: MapSurfaceController,
        native: Rc<RefCell<HeadlessEngine>>,
        events: Receiver<MapEvent>,
    }

    fn fixture_with(params: CreationParams) -> Fixture {
        let native = HeadlessEngine::new(CameraPosition::default()).shared();
        let shared: SharedEngine = native.clone();
        let (tx, events) = unbounded();
        let request = CreationRequest {
            frame: FRAME,
            view_id: ViewId::new(1),
            params,
        };
        let surface =
            MapSurfaceController::create(request, shared, tx, Duration::from_millis(300)).unwrap();
        Fixture {
            surface,
            native,
            events,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(CreationParams::default())
    }

    fn drain(events: &Receiver<MapEvent>) -> Vec<MapEvent> {
        events.try_iter().collect()
    }

    #[test]
    fn test_default_camera_then_move() {
        let Fixture { mut surface, .. } = fixture();
        assert_eq!(surface.camera_position(), CameraPosition::default());

        let update = CameraUpdate::NewCameraPosition(CameraPosition::new(LatLng::new(0.0, 0.0), 10.0));
        surface.move_camera(&update).unwrap();
        let camera = surface.camera_position();
        assert_eq!(camera.target, LatLng::new(0.0, 0.0));
        assert_eq!(camera.zoom, 10.0);
    }

    #[test]
    fn test_invalid_camera_update_keeps_camera() {
        let Fixture { mut surface, .. } = fixture();
        let before = surface.camera_position();
        let update = CameraUpdate::NewLatLng(LatLng::new(f64::NAN, 1.0));
        assert!(matches!(
            surface.move_camera(&update),
            Err(MapError::InvalidCameraUpdate(_))
        ));
        assert!(surface.animate_camera(&update).is_err());
        assert_eq!(surface.camera_position(), before);
    }

    #[test]
    fn test_marker_ids_and_removal() {
        let Fixture { mut surface, native, .. } = fixture();
        let first = surface.add_marker(LatLng::new(1.0, 1.0)).unwrap();
        let second = surface.add_marker(LatLng::new(2.0, 2.0)).unwrap();
        assert_eq!(first, "m0");
        assert_eq!(second, "m1");
        assert_eq!(native.borrow().overlay_count(), 2);

        surface.remove_marker("m0").unwrap();
        assert!(matches!(
            surface.remove_marker("m0"),
            Err(MapError::NotFound { kind: OverlayKind::Marker, .. })
        ));
        assert!(surface.marker("m0").is_err());
        assert_eq!(native.borrow().overlay_count(), 1);

        let third = surface.add_marker(LatLng::new(3.0, 3.0)).unwrap();
        assert_eq!(third, "m2");
    }

    #[test]
    fn test_marker_round_trip() {
        let Fixture { mut surface, .. } = fixture();
        let position = LatLng::new(48.85, 2.35);
        let id = surface.add_marker(position).unwrap();
        assert_eq!(surface.marker(id.as_str()).unwrap().position(), position);

        surface.marker_mut(id.as_str()).unwrap().set_alpha(0.25).unwrap();
        assert_eq!(surface.marker(id.as_str()).unwrap().options().alpha, 0.25);
    }

    #[test]
    fn test_invalid_marker_position() {
        let Fixture { mut surface, native, .. } = fixture();
        assert!(matches!(
            surface.add_marker(LatLng::new(f64::NAN, 0.0)),
            Err(MapError::InvalidCoordinate { .. })
        ));
        assert_eq!(native.borrow().overlay_count(), 0);
        assert!(surface.marker_ids().is_empty());
    }

    #[test]
    fn test_marker_accepts_any_finite_coordinate() {
        let Fixture { mut surface, .. } = fixture();
        let id = surface.add_marker(LatLng::new(95.0, 200.0)).unwrap();
        assert_eq!(
            surface.marker(id.as_str()).unwrap().position(),
            LatLng::new(95.0, 200.0)
        );
    }

    #[test]
    fn test_polyline_boundaries() {
        let Fixture { mut surface, .. } = fixture();
        assert!(matches!(
            surface.add_polyline(vec![LatLng::new(0.0, 0.0)]),
            Err(MapError::InvalidPath { points: 1 })
        ));
        let id = surface
            .add_polyline(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)])
            .unwrap();
        assert_eq!(id, "p0");
        surface.polyline_mut("p0").unwrap().set_width(3.0).unwrap();
        surface.remove_polyline("p0").unwrap();
        assert!(surface.polyline("p0").is_err());
    }

    #[test]
    fn test_namespaces_are_independent() {
        let Fixture { mut surface, .. } = fixture();
        let marker = surface.add_marker(LatLng::new(1.0, 1.0)).unwrap();
        let polyline = surface
            .add_polyline(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)])
            .unwrap();
        assert!(surface.polyline(marker.as_str()).is_err());
        assert!(surface.marker(polyline.as_str()).is_err());
    }

    #[test]
    fn test_zoom_range_rejected_without_change() {
        let Fixture { mut surface, native, .. } = fixture();
        surface.set_zoom_range(Some(2.0), Some(10.0)).unwrap();
        let before = surface.settings().zoom_range;

        assert!(matches!(
            surface.set_zoom_range(Some(5.0), Some(3.0)),
            Err(MapError::InvalidRange { .. })
        ));
        assert_eq!(surface.settings().zoom_range, before);
        assert_eq!(native.borrow().zoom_limits(), (2.0, 10.0));
    }

    #[test]
    fn test_zoom_range_clamps_camera() {
        let Fixture { mut surface, .. } = fixture();
        surface.move_camera(&CameraUpdate::ZoomTo(15.0)).unwrap();
        surface.set_zoom_range(None, Some(12.0)).unwrap();
        assert_eq!(surface.camera_position().zoom, 12.0);
        surface.move_camera(&CameraUpdate::ZoomTo(18.0)).unwrap();
        assert_eq!(surface.camera_position().zoom, 12.0);
    }

    #[test]
    fn test_target_bounds_clamp_camera() {
        let Fixture { mut surface, .. } = fixture();
        let bounds = LatLngBounds::new(LatLng::new(40.0, -5.0), LatLng::new(50.0, 5.0)).unwrap();
        surface.set_camera_target_bounds(Some(bounds)).unwrap();
        assert_eq!(surface.camera_position().target, LatLng::new(40.0, 0.0));

        surface
            .move_camera(&CameraUpdate::NewLatLng(LatLng::new(60.0, 20.0)))
            .unwrap();
        assert_eq!(surface.camera_position().target, LatLng::new(50.0, 5.0));

        surface.set_camera_target_bounds(None).unwrap();
        surface
            .move_camera(&CameraUpdate::NewLatLng(LatLng::new(60.0, 20.0)))
            .unwrap();
        assert_eq!(surface.camera_position().target, LatLng::new(60.0, 20.0));
    }

    #[test]
    fn test_zoom_range_retargets_animation() {
        let Fixture { mut surface, .. } = fixture();
        surface.animate_camera(&CameraUpdate::ZoomTo(18.0)).unwrap();
        surface.pump(Duration::from_millis(10));
        surface.set_zoom_range(None, Some(10.0)).unwrap();
        surface.pump(Duration::from_secs(1));
        assert_eq!(surface.camera_position().zoom, 10.0);
    }

    #[test]
    fn test_target_bounds_retarget_animation() {
        let Fixture { mut surface, native, .. } = fixture();
        surface
            .animate_camera(&CameraUpdate::NewLatLng(LatLng::new(60.0, 60.0)))
            .unwrap();
        let bounds = LatLngBounds::new(LatLng::new(-1.0, -1.0), LatLng::new(1.0, 1.0)).unwrap();
        surface.set_camera_target_bounds(Some(bounds)).unwrap();
        assert!(native.borrow().is_animating());

        surface.pump(Duration::from_secs(1));
        assert_eq!(surface.camera_position().target, LatLng::new(1.0, 1.0));
    }

    #[test]
    fn test_setters_are_idempotent() {
        let Fixture { mut surface, native, .. } = fixture();
        let style = r#"[{"stylers": [{"visibility": "simplified"}]}]"#;

        let bounds = LatLngBounds::new(LatLng::new(-10.0, -10.0), LatLng::new(10.0, 10.0)).unwrap();

        let apply = |surface: &mut MapSurfaceController| {
            surface.set_camera_target_bounds(Some(bounds)).unwrap();
            surface.set_compass_enabled(false).unwrap();
            surface.set_map_type(MapType::Hybrid).unwrap();
            surface.set_map_style(Some(style)).unwrap();
            surface.set_zoom_range(Some(3.0), Some(9.0)).unwrap();
            surface.set_rotate_gestures_enabled(false).unwrap();
            surface.set_scroll_gestures_enabled(false).unwrap();
            surface.set_tilt_gestures_enabled(false).unwrap();
            surface.set_zoom_gestures_enabled(true).unwrap();
            surface.set_track_camera_position(true).unwrap();
            surface.set_my_location_enabled(true).unwrap();
        };
        apply(&mut surface);
        let once = surface.settings().clone();
        let camera_once = surface.camera_position();
        apply(&mut surface);
        assert_eq!(surface.settings(), &once);
        assert_eq!(surface.camera_position(), camera_once);

        let native = native.borrow();
        assert_eq!(native.target_bounds(), Some(bounds));
        assert!(!native.compass_enabled());
        assert_eq!(native.map_type(), MapType::Hybrid);
        assert!(native.style().is_some());
        assert!(!native.gesture_enabled(Gesture::Rotate));
        assert!(!native.gesture_enabled(Gesture::Scroll));
        assert!(!native.gesture_enabled(Gesture::Tilt));
        assert!(native.gesture_enabled(Gesture::Zoom));
    }

    #[test]
    fn test_bad_style_keeps_current() {
        let Fixture { mut surface, native, .. } = fixture();
        surface.set_map_style(Some("[]")).unwrap();
        assert!(matches!(
            surface.set_map_style(Some("not json")),
            Err(MapError::StyleParse(_))
        ));
        assert_eq!(surface.settings().map_style.as_ref().map(|s| s.as_json()), Some("[]"));

        surface.set_map_style(None).unwrap();
        assert!(surface.settings().map_style.is_none());
        assert!(native.borrow().style().is_none());
    }

    #[test]
    fn test_bulk_update_is_all_or_nothing() {
        let Fixture { mut surface, .. } = fixture();
        let options = MapOptions {
            compass_enabled: Some(false),
            map_style: Some(Some("{broken".into())),
            ..Default::default()
        };
        assert!(surface.update_options(&options).is_err());
        assert!(surface.settings().compass_enabled);

        let options = MapOptions {
            compass_enabled: Some(false),
            min_max_zoom_preference: Some(ZoomRange::from((Some(8.0), Some(4.0)))),
            ..Default::default()
        };
        assert!(surface.update_options(&options).is_err());
        assert!(surface.settings().compass_enabled);
    }

    #[test]
    fn test_my_location_waits_for_permission() {
        let Fixture { mut surface, native, .. } = fixture();
        surface.set_my_location_enabled(true).unwrap();
        assert!(surface.settings().my_location_enabled);
        assert!(!surface.my_location_visible());
        assert!(!native.borrow().my_location_layer_visible());

        native.borrow_mut().grant_permission(Permission::Location);
        surface.pump(Duration::ZERO);
        assert!(surface.my_location_visible());
        assert!(native.borrow().my_location_layer_visible());

        surface.set_my_location_enabled(false).unwrap();
        assert!(!native.borrow().my_location_layer_visible());
    }

    #[test]
    fn test_camera_events_only_when_tracking() {
        let Fixture { mut surface, events, .. } = fixture();
        surface.move_camera(&CameraUpdate::ZoomTo(4.0)).unwrap();
        surface.pump(Duration::ZERO);
        assert!(drain(&events).is_empty());

        surface.set_track_camera_position(true).unwrap();
        surface.move_camera(&CameraUpdate::ZoomTo(6.0)).unwrap();
        assert_eq!(surface.pump(Duration::ZERO), 1);
        match drain(&events).as_slice() {
            [MapEvent::CameraChanged { position, .. }] => assert_eq!(position.zoom, 6.0),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_animation_reports_once_when_settled() {
        let Fixture { mut surface, events, .. } = fixture();
        surface.set_track_camera_position(true).unwrap();
        surface.animate_camera(&CameraUpdate::ZoomTo(8.0)).unwrap();

        for _ in 0..4 {
            surface.pump(Duration::from_millis(50));
        }
        assert!(drain(&events).is_empty());
        assert!(surface.camera_position().zoom < 8.0);

        surface.pump(Duration::from_millis(200));
        assert_eq!(drain(&events).len(), 1);
        assert_eq!(surface.camera_position().zoom, 8.0);
    }

    #[test]
    fn test_overlay_taps_become_events() {
        let Fixture { mut surface, native, events } = fixture();
        let marker = surface.add_marker(LatLng::new(1.0, 1.0)).unwrap();
        let polyline = surface
            .add_polyline(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)])
            .unwrap();
        let marker_handle = surface.marker(marker.as_str()).unwrap().handle();
        let polyline_handle = surface.polyline(polyline.as_str()).unwrap().handle();

        native.borrow_mut().tap(marker_handle);
        native.borrow_mut().tap(polyline_handle);
        native
            .borrow_mut()
            .drag_marker(marker_handle, LatLng::new(5.0, 5.0));
        assert_eq!(surface.pump(Duration::ZERO), 3);

        let received = drain(&events);
        assert!(matches!(&received[0], MapEvent::MarkerTapped { marker_id, .. } if *marker_id == marker));
        assert!(matches!(&received[1], MapEvent::PolylineTapped { polyline_id, .. } if *polyline_id == polyline));
        assert!(matches!(&received[2], MapEvent::MarkerDragEnd { position, .. } if *position == LatLng::new(5.0, 5.0)));
        assert_eq!(surface.marker(marker.as_str()).unwrap().position(), LatLng::new(5.0, 5.0));
    }

    #[test]
    fn test_show_hide_keeps_state() {
        let Fixture { mut surface, native, .. } = fixture();
        assert_eq!(surface.state(), SurfaceState::Created);
        assert!(native.borrow().is_hidden());

        surface.add_marker(LatLng::new(1.0, 1.0)).unwrap();
        surface.move_camera(&CameraUpdate::ZoomTo(7.0)).unwrap();
        surface.show(10.0, 20.0).unwrap();
        assert!(surface.is_visible());
        assert_eq!(native.borrow().frame(), Frame::new(10.0, 20.0, 400.0, 300.0));

        surface.hide().unwrap();
        assert_eq!(surface.state(), SurfaceState::Hidden);
        assert!(native.borrow().is_hidden());
        assert_eq!(surface.marker_ids().len(), 1);
        assert_eq!(surface.camera_position().zoom, 7.0);

        surface.show(0.0, 0.0).unwrap();
        assert_eq!(surface.render().unwrap().overlays, 1);
    }

    #[test]
    fn test_destroy_is_terminal() {
        let Fixture { mut surface, native, .. } = fixture();
        surface.add_marker(LatLng::new(1.0, 1.0)).unwrap();
        surface.add_polyline(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]).unwrap();
        surface.move_camera(&CameraUpdate::ZoomTo(5.0)).unwrap();

        surface.destroy();
        assert!(surface.is_destroyed());
        assert_eq!(native.borrow().overlay_count(), 0);
        assert_eq!(surface.camera_position().zoom, 5.0);

        assert!(matches!(surface.add_marker(LatLng::new(0.0, 0.0)), Err(MapError::Disposed(_))));
        assert!(matches!(surface.marker("m0"), Err(MapError::Disposed(_))));
        assert!(matches!(surface.remove_polyline("p0"), Err(MapError::Disposed(_))));
        assert!(matches!(surface.move_camera(&CameraUpdate::ZoomIn), Err(MapError::Disposed(_))));
        assert!(matches!(surface.set_compass_enabled(true), Err(MapError::Disposed(_))));
        assert!(matches!(surface.show(0.0, 0.0), Err(MapError::Disposed(_))));
        assert_eq!(surface.pump(Duration::from_secs(1)), 0);

        surface.destroy();
        assert!(surface.is_destroyed());
    }

    #[test]
    fn test_rejected_initial_args_leave_native_untouched() {
        let native = HeadlessEngine::new(CameraPosition::default()).shared();
        let shared: SharedEngine = native.clone();
        let (tx, _events) = unbounded();
        let params: CreationParams =
            serde_json::from_str(r#"{"options": {"compassEnabled": false, "mapStyle": "{broken"}}"#)
                .unwrap();
        let request = CreationRequest {
            frame: FRAME,
            view_id: ViewId::new(1),
            params,
        };
        let result = MapSurfaceController::create(request, shared, tx, Duration::from_millis(300));
        assert!(matches!(result, Err(MapError::StyleParse(_))));
        drop(result);

        let native = native.borrow();
        assert!(native.compass_enabled());
        assert!(native.style().is_none());
        assert!(native.is_hidden());
    }

    #[test]
    fn test_initial_args_applied() {
        let params: CreationParams = serde_json::from_str(
            r#"{"initialCameraPosition": {"target": [10, 20], "zoom": 9},
                "options": {"mapType": 2, "minMaxZoomPreference": [null, 8]}}"#,
        )
        .unwrap();
        let Fixture { surface, native, .. } = fixture_with(params);
        assert_eq!(surface.settings().map_type, MapType::Satellite);
        assert_eq!(native.borrow().map_type(), MapType::Satellite);
        assert_eq!(surface.camera_position().target, LatLng::new(10.0, 20.0));
        assert_eq!(surface.camera_position().zoom, 8.0);
        assert!(surface.settings().compass_enabled);
    }
}
