//! fmap Surface
//!
//! The map surface controller embedded into the host UI:
//! - Option sink applying map-level settings to the native map
//! - Camera moves and animations, clamped to the configured limits
//! - Marker and polyline lifecycles through identifier registries
//! - Upward events (camera settled, overlay taps) on a single channel
//! - Factory creating one controller per host view

mod event;
mod factory;
mod options;
mod sink;
mod surface;

pub use event::MapEvent;
pub use factory::{CreationRequest, SurfaceFactory, DEFAULT_ANIMATION_DURATION};
pub use options::{CreationParams, MapOptions};
pub use sink::{MapOptionsSink, PlatformView};
pub use surface::{MapSurfaceController, SurfaceState};
