//! Events sent from surfaces up to the UI layer.

use fmap_core::{CameraPosition, LatLng, ViewId};
use fmap_overlays::OverlayId;
use serde::Serialize;

/// Notifications a surface raises without being asked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MapEvent {
    /// A camera movement settled. Only sent while camera tracking is on.
    CameraChanged {
        view_id: ViewId,
        position: CameraPosition,
    },
    /// The user tapped a marker.
    MarkerTapped { view_id: ViewId, marker_id: OverlayId },
    /// The user tapped a polyline.
    PolylineTapped {
        view_id: ViewId,
        polyline_id: OverlayId,
    },
    /// The user dropped a dragged marker.
    MarkerDragEnd {
        view_id: ViewId,
        marker_id: OverlayId,
        position: LatLng,
    },
}

impl MapEvent {
    /// Surface the event came from.
    pub fn view_id(&self) -> ViewId {
        match self {
            Self::CameraChanged { view_id, .. }
            | Self::MarkerTapped { view_id, .. }
            | Self::PolylineTapped { view_id, .. }
            | Self::MarkerDragEnd { view_id, .. } => *view_id,
        }
    }
}
