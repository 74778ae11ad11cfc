//! Surface factory.

use crate::event::MapEvent;
use crate::options::CreationParams;
use crate::surface::MapSurfaceController;
use crossbeam_channel::Sender;
use fmap_core::{EngineProvider, Frame, MapError, ViewId};
use std::time::Duration;
use tracing::{error, info};

/// Animation length used when the host does not configure one.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Everything the host knows when it asks for a new map view.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationRequest {
    pub frame: Frame,
    pub view_id: ViewId,
    pub params: CreationParams,
}

/// Creates one [`MapSurfaceController`] per host view.
pub struct SurfaceFactory {
    provider: Box<dyn EngineProvider>,
    animation_duration: Duration,
}

impl SurfaceFactory {
    pub fn new(provider: Box<dyn EngineProvider>) -> Self {
        Self {
            provider,
            animation_duration: DEFAULT_ANIMATION_DURATION,
        }
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Build a native map for `request` and wrap it in a controller.
    ///
    /// Fails with [`MapError::Initialization`] when no native map can be
    /// created, or with the matching validation error when the initial
    /// arguments are invalid.
    pub fn create(
        &self,
        request: CreationRequest,
        events: Sender<MapEvent>,
    ) -> Result<MapSurfaceController, MapError> {
        let view_id = request.view_id;
        info!("Creating map surface {} in {:?}", view_id, request.frame);

        let engine = self.provider.create_engine(request.frame).map_err(|e| {
            error!("Native map for {} failed: {}", view_id, e);
            e
        })?;
        MapSurfaceController::create(request, engine, events, self.animation_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use fmap_core::{CameraPosition, HeadlessProvider, LatLng, MapType};

    fn request(params: CreationParams) -> CreationRequest {
        CreationRequest {
            frame: Frame::new(0.0, 0.0, 320.0, 480.0),
            view_id: ViewId::new(7),
            params,
        }
    }

    #[test]
    fn test_missing_key_fails_initialization() {
        let factory = SurfaceFactory::new(Box::new(HeadlessProvider::new(None)));
        let (tx, _rx) = unbounded();
        let result = factory.create(request(CreationParams::default()), tx);
        assert!(matches!(result, Err(MapError::Initialization(_))));
    }

    #[test]
    fn test_creates_with_provider_defaults() {
        let home = CameraPosition::new(LatLng::new(52.52, 13.40), 12.0);
        let provider = HeadlessProvider::new(Some("key".into())).with_default_camera(home);
        let factory = SurfaceFactory::new(Box::new(provider));
        let (tx, _rx) = unbounded();

        let surface = factory.create(request(CreationParams::default()), tx).unwrap();
        assert_eq!(surface.camera_position(), home);
        assert_eq!(surface.settings().map_type, MapType::Normal);
    }

    #[test]
    fn test_bad_initial_style_rejected() {
        let factory = SurfaceFactory::new(Box::new(HeadlessProvider::new(Some("key".into()))));
        let (tx, _rx) = unbounded();
        let params: CreationParams =
            serde_json::from_str(r#"{"options": {"mapStyle": "{not a style"}}"#).unwrap();
        let result = factory.create(request(params), tx);
        assert!(matches!(result, Err(MapError::StyleParse(_))));
    }
}
