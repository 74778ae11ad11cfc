//! fmap Host
//!
//! Embeds map surfaces into a host application:
//! - Surface registry keyed by host view id, with a shared event channel
//! - Method-call bridge decoding UI requests into surface operations
//! - TOML host configuration

mod bridge;
mod config;
mod host;

pub use bridge::{decode_camera_update, encode_reply, BridgeError, MethodCall};
pub use config::{ConfigError, HostConfig};
pub use host::MapHost;
