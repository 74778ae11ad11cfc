//! Map host - owns every surface and the upward event channel.

use crate::config::{ConfigError, HostConfig};
use crossbeam_channel::{unbounded, Receiver, Sender};
use fmap_core::{EngineProvider, HeadlessProvider, MapError, ViewId, ZoomRange};
use fmap_surface::{CreationRequest, MapEvent, MapSurfaceController, SurfaceFactory};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Registry of live map surfaces, keyed by the host view id.
pub struct MapHost {
    factory: SurfaceFactory,
    /// All live surfaces
    pub(crate) surfaces: HashMap<ViewId, MapSurfaceController>,
    /// Ids of destroyed surfaces; never handed out again
    pub(crate) retired: HashSet<ViewId>,
    /// Zoom clamp for surfaces that do not request one
    default_zoom: ZoomRange,
    events_rx: Receiver<MapEvent>,
    events_tx: Sender<MapEvent>,
}

impl MapHost {
    /// Create a host backed by the headless engine.
    pub fn new(config: &HostConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let provider = HeadlessProvider::new(config.api_key.clone())
            .with_default_camera(config.default_camera)
            .with_location_permission(config.location_permission_granted);
        Self::with_provider(Box::new(provider), config)
    }

    /// Create a host around any engine provider.
    pub fn with_provider(
        provider: Box<dyn EngineProvider>,
        config: &HostConfig,
    ) -> Result<Self, ConfigError> {
        info!("Initializing map host");
        let (events_tx, events_rx) = unbounded();
        Ok(Self {
            factory: SurfaceFactory::new(provider)
                .with_animation_duration(config.animation_duration()),
            surfaces: HashMap::new(),
            retired: HashSet::new(),
            default_zoom: config.zoom_range()?,
            events_rx,
            events_tx,
        })
    }

    /// Create a surface for a new host view.
    pub fn create_surface(&mut self, mut request: CreationRequest) -> Result<ViewId, MapError> {
        let view_id = request.view_id;
        if self.surfaces.contains_key(&view_id) || self.retired.contains(&view_id) {
            warn!("Rejected surface creation for reused {}", view_id);
            return Err(MapError::Initialization(format!("{view_id} is already in use")));
        }

        let options = &mut request.params.options;
        if options.min_max_zoom_preference.is_none() && self.default_zoom != ZoomRange::UNBOUNDED {
            options.min_max_zoom_preference = Some(self.default_zoom);
        }

        let surface = self.factory.create(request, self.events_tx.clone())?;
        self.surfaces.insert(view_id, surface);
        Ok(view_id)
    }

    /// Destroy a surface. Returns `false` if no live surface has that id.
    pub fn destroy_surface(&mut self, view_id: ViewId) -> bool {
        match self.surfaces.remove(&view_id) {
            Some(mut surface) => {
                surface.destroy();
                self.retired.insert(view_id);
                true
            }
            None => false,
        }
    }

    pub fn surface(&self, view_id: ViewId) -> Option<&MapSurfaceController> {
        self.surfaces.get(&view_id)
    }

    pub fn surface_mut(&mut self, view_id: ViewId) -> Option<&mut MapSurfaceController> {
        self.surfaces.get_mut(&view_id)
    }

    /// Live view ids, ascending.
    pub fn view_ids(&self) -> Vec<ViewId> {
        let mut ids: Vec<_> = self.surfaces.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Advance every surface's engine clock. Returns the number of events raised.
    pub fn pump(&mut self, elapsed: Duration) -> usize {
        let sent: usize = self
            .surfaces
            .values_mut()
            .map(|surface| surface.pump(elapsed))
            .sum();
        if sent > 0 {
            debug!("Pump raised {} events", sent);
        }
        sent
    }

    /// Collect pending events (non-blocking).
    pub fn poll_events(&self) -> Vec<MapEvent> {
        self.events_rx.try_iter().collect()
    }
}

impl Drop for MapHost {
    fn drop(&mut self) {
        info!("Shutting down map host");
        for view_id in self.view_ids() {
            self.destroy_surface(view_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmap_core::{CameraPosition, CameraUpdate, Frame, LatLng};
    use fmap_surface::{CreationParams, MapOptionsSink};

    fn request(id: i64) -> CreationRequest {
        CreationRequest {
            frame: Frame::new(0.0, 0.0, 300.0, 300.0),
            view_id: ViewId::new(id),
            params: CreationParams::default(),
        }
    }

    #[test]
    fn test_create_and_destroy_surface() {
        let mut host = MapHost::new(&HostConfig::offline()).unwrap();

        let view = host.create_surface(request(1)).unwrap();
        assert_eq!(host.surface_count(), 1);
        assert!(host.surface(view).is_some());

        assert!(host.destroy_surface(view));
        assert_eq!(host.surface_count(), 0);
        assert!(!host.destroy_surface(view));
    }

    #[test]
    fn test_view_ids_not_reused() {
        let mut host = MapHost::new(&HostConfig::offline()).unwrap();
        host.create_surface(request(1)).unwrap();
        assert!(matches!(
            host.create_surface(request(1)),
            Err(MapError::Initialization(_))
        ));

        host.destroy_surface(ViewId::new(1));
        assert!(host.create_surface(request(1)).is_err());
        host.create_surface(request(2)).unwrap();
        assert_eq!(host.view_ids(), vec![ViewId::new(2)]);
    }

    #[test]
    fn test_missing_api_key() {
        let mut host = MapHost::new(&HostConfig::default()).unwrap();
        assert!(matches!(
            host.create_surface(request(1)),
            Err(MapError::Initialization(_))
        ));
        assert_eq!(host.surface_count(), 0);
    }

    #[test]
    fn test_config_defaults_reach_surfaces() {
        let config = HostConfig {
            default_camera: CameraPosition::new(LatLng::new(35.68, 139.69), 10.0),
            max_zoom: Some(15.0),
            ..HostConfig::offline()
        };
        let mut host = MapHost::new(&config).unwrap();
        let view = host.create_surface(request(3)).unwrap();

        let surface = host.surface_mut(view).unwrap();
        assert_eq!(surface.camera_position().target, LatLng::new(35.68, 139.69));
        surface.move_camera(&CameraUpdate::ZoomTo(19.0)).unwrap();
        assert_eq!(surface.camera_position().zoom, 15.0);
        assert!(!surface.my_location_visible());
        surface.set_my_location_enabled(true).unwrap();
        assert!(surface.my_location_visible());
    }

    #[test]
    fn test_pump_collects_events_from_all_surfaces() {
        let mut host = MapHost::new(&HostConfig::offline()).unwrap();
        for id in [1, 2] {
            let view = host.create_surface(request(id)).unwrap();
            let surface = host.surface_mut(view).unwrap();
            surface.set_track_camera_position(true).unwrap();
            surface.move_camera(&CameraUpdate::ZoomTo(3.0)).unwrap();
        }

        assert_eq!(host.pump(Duration::ZERO), 2);
        let mut views: Vec<_> = host.poll_events().iter().map(MapEvent::view_id).collect();
        views.sort();
        assert_eq!(views, vec![ViewId::new(1), ViewId::new(2)]);
        assert!(host.poll_events().is_empty());
    }
}
