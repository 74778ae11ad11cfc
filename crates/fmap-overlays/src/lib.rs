//! fmap Overlays
//!
//! Controllers for the native overlays drawn on a map surface:
//! - Marker and polyline controllers, each wrapping one native overlay
//! - Identifier registries minting stable, never-reused overlay ids

mod id;
mod marker;
mod polyline;
mod registry;

pub use id::OverlayId;
pub use marker::MarkerController;
pub use polyline::PolylineController;
pub use registry::{IdentifierRegistry, OverlayController};
