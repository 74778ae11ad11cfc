//! Polyline controller.

use crate::registry::OverlayController;
use fmap_core::{
    LatLng, MapError, NativeOverlay, OverlayHandle, OverlayKind, PolylineOptions, PolylinePatch,
    SharedEngine,
};
use tracing::debug;

/// Owns one native polyline.
pub struct PolylineController {
    handle: OverlayHandle,
    options: PolylineOptions,
    engine: SharedEngine,
}

impl PolylineController {
    /// Create the native polyline and attach it to the map.
    pub fn attach(engine: SharedEngine, options: PolylineOptions) -> Result<Self, MapError> {
        options.validate()?;
        let handle = engine
            .borrow_mut()
            .attach_overlay(NativeOverlay::Polyline(options.clone()));
        Ok(Self {
            handle,
            options,
            engine,
        })
    }

    pub fn options(&self) -> &PolylineOptions {
        &self.options
    }

    pub fn points(&self) -> &[LatLng] {
        &self.options.points
    }

    /// Replace the path; needs at least two points.
    pub fn set_points(&mut self, points: Vec<LatLng>) -> Result<(), MapError> {
        self.commit(PolylineOptions {
            points,
            ..self.options.clone()
        })
    }

    pub fn set_width(&mut self, width: f64) -> Result<(), MapError> {
        self.commit(PolylineOptions {
            width,
            ..self.options.clone()
        })
    }

    /// ARGB color.
    pub fn set_color(&mut self, color: u32) -> Result<(), MapError> {
        self.commit(PolylineOptions {
            color,
            ..self.options.clone()
        })
    }

    pub fn set_geodesic(&mut self, geodesic: bool) -> Result<(), MapError> {
        self.commit(PolylineOptions {
            geodesic,
            ..self.options.clone()
        })
    }

    pub fn set_visible(&mut self, visible: bool) -> Result<(), MapError> {
        self.commit(PolylineOptions {
            visible,
            ..self.options.clone()
        })
    }

    pub fn set_z_index(&mut self, z_index: f64) -> Result<(), MapError> {
        self.commit(PolylineOptions {
            z_index,
            ..self.options.clone()
        })
    }

    pub fn set_clickable(&mut self, clickable: bool) -> Result<(), MapError> {
        self.commit(PolylineOptions {
            clickable,
            ..self.options.clone()
        })
    }

    /// Apply several changes at once; all or nothing.
    pub fn apply(&mut self, patch: &PolylinePatch) -> Result<(), MapError> {
        let next = patch.apply_to(&self.options)?;
        self.commit(next)
    }

    fn commit(&mut self, next: PolylineOptions) -> Result<(), MapError> {
        next.validate()?;
        if next == self.options {
            return Ok(());
        }
        self.engine
            .borrow_mut()
            .update_overlay(self.handle, NativeOverlay::Polyline(next.clone()));
        self.options = next;
        Ok(())
    }
}

impl OverlayController for PolylineController {
    const KIND: OverlayKind = OverlayKind::Polyline;

    fn handle(&self) -> OverlayHandle {
        self.handle
    }

    fn dispose(self) {
        debug!("Detaching polyline {}", self.handle);
        self.engine.borrow_mut().detach_overlay(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmap_core::{CameraPosition, HeadlessEngine, MapEngine};

    fn path(len: usize) -> Vec<LatLng> {
        (0..len).map(|i| LatLng::new(i as f64, i as f64 * 2.0)).collect()
    }

    #[test]
    fn test_path_needs_two_points() {
        let native = HeadlessEngine::new(CameraPosition::default()).shared();
        let shared: SharedEngine = native.clone();

        let result = PolylineController::attach(shared.clone(), PolylineOptions::along(path(1)));
        assert!(matches!(result, Err(MapError::InvalidPath { points: 1 })));
        assert_eq!(native.borrow().overlay_count(), 0);

        let polyline = PolylineController::attach(shared, PolylineOptions::along(path(2))).unwrap();
        assert_eq!(polyline.points().len(), 2);
        assert_eq!(native.borrow().overlay_count(), 1);
    }

    #[test]
    fn test_mutators_reach_native() {
        let native = HeadlessEngine::new(CameraPosition::default()).shared();
        let shared: SharedEngine = native.clone();
        let mut polyline = PolylineController::attach(shared, PolylineOptions::along(path(3))).unwrap();

        polyline.set_width(4.0).unwrap();
        polyline.set_color(0xFFFF_0000).unwrap();
        polyline.set_geodesic(true).unwrap();
        polyline.set_points(path(5)).unwrap();

        let stored = match native.borrow().overlay(polyline.handle()) {
            Some(NativeOverlay::Polyline(options)) => options.clone(),
            other => panic!("expected a polyline, found {other:?}"),
        };
        assert_eq!(stored.width, 4.0);
        assert_eq!(stored.color, 0xFFFF_0000);
        assert!(stored.geodesic);
        assert_eq!(stored.points.len(), 5);
    }

    #[test]
    fn test_shrinking_path_rejected() {
        let native = HeadlessEngine::new(CameraPosition::default()).shared();
        let shared: SharedEngine = native.clone();
        let mut polyline = PolylineController::attach(shared, PolylineOptions::along(path(3))).unwrap();
        assert!(polyline.set_points(path(1)).is_err());
        assert_eq!(polyline.points().len(), 3);
        assert!(polyline.set_width(-1.0).is_err());
        assert_eq!(polyline.options().width, 10.0);
    }

    #[test]
    fn test_dispose_detaches() {
        let native = HeadlessEngine::new(CameraPosition::default()).shared();
        let shared: SharedEngine = native.clone();
        let polyline = PolylineController::attach(shared, PolylineOptions::along(path(2))).unwrap();
        polyline.dispose();
        assert_eq!(native.borrow().overlay_count(), 0);
    }
}
