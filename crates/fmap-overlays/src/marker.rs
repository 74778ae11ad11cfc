//! Marker controller.

use crate::registry::OverlayController;
use fmap_core::{
    Anchor, LatLng, MapError, MarkerIcon, MarkerOptions, MarkerPatch, NativeOverlay,
    OverlayHandle, OverlayKind, SharedEngine,
};
use tracing::debug;

/// Owns one native marker and pushes every change straight to it.
///
/// Setters validate first and leave the marker untouched on error. Setting a
/// value the marker already has does not reach the engine.
pub struct MarkerController {
    handle: OverlayHandle,
    options: MarkerOptions,
    engine: SharedEngine,
}

impl MarkerController {
    /// Create the native marker and attach it to the map.
    pub fn attach(engine: SharedEngine, options: MarkerOptions) -> Result<Self, MapError> {
        let options = options.normalized()?;
        let handle = engine
            .borrow_mut()
            .attach_overlay(NativeOverlay::Marker(options.clone()));
        Ok(Self {
            handle,
            options,
            engine,
        })
    }

    pub fn options(&self) -> &MarkerOptions {
        &self.options
    }

    pub fn position(&self) -> LatLng {
        self.options.position
    }

    pub fn set_position(&mut self, position: LatLng) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            position,
            ..self.options.clone()
        })
    }

    pub fn set_alpha(&mut self, alpha: f64) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            alpha,
            ..self.options.clone()
        })
    }

    pub fn set_anchor(&mut self, anchor: Anchor) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            anchor,
            ..self.options.clone()
        })
    }

    pub fn set_consume_tap_events(&mut self, consume: bool) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            consume_tap_events: consume,
            ..self.options.clone()
        })
    }

    pub fn set_draggable(&mut self, draggable: bool) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            draggable,
            ..self.options.clone()
        })
    }

    pub fn set_flat(&mut self, flat: bool) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            flat,
            ..self.options.clone()
        })
    }

    pub fn set_icon(&mut self, icon: MarkerIcon) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            icon,
            ..self.options.clone()
        })
    }

    pub fn set_info_window(
        &mut self,
        title: Option<String>,
        snippet: Option<String>,
    ) -> Result<(), MapError> {
        let mut next = self.options.clone();
        next.info_window.title = title;
        next.info_window.snippet = snippet;
        self.commit(next)
    }

    pub fn set_info_window_anchor(&mut self, anchor: Anchor) -> Result<(), MapError> {
        let mut next = self.options.clone();
        next.info_window.anchor = anchor;
        self.commit(next)
    }

    /// Degrees clockwise; any finite angle is accepted and wrapped.
    pub fn set_rotation(&mut self, rotation: f64) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            rotation,
            ..self.options.clone()
        })
    }

    pub fn set_visible(&mut self, visible: bool) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            visible,
            ..self.options.clone()
        })
    }

    pub fn set_z_index(&mut self, z_index: f64) -> Result<(), MapError> {
        self.commit(MarkerOptions {
            z_index,
            ..self.options.clone()
        })
    }

    /// Apply several changes at once; all or nothing.
    pub fn apply(&mut self, patch: &MarkerPatch) -> Result<(), MapError> {
        let next = patch.apply_to(&self.options)?;
        self.commit(next)
    }

    /// Record a position the native side reached on its own (user drag).
    pub fn sync_position(&mut self, position: LatLng) {
        self.options.position = position;
    }

    fn commit(&mut self, next: MarkerOptions) -> Result<(), MapError> {
        let next = next.normalized()?;
        if next == self.options {
            return Ok(());
        }
        self.engine
            .borrow_mut()
            .update_overlay(self.handle, NativeOverlay::Marker(next.clone()));
        self.options = next;
        Ok(())
    }
}

impl OverlayController for MarkerController {
    const KIND: OverlayKind = OverlayKind::Marker;

    fn handle(&self) -> OverlayHandle {
        self.handle
    }

    fn dispose(self) {
        debug!("Detaching marker {}", self.handle);
        self.engine.borrow_mut().detach_overlay(self.handle);
    }
}
