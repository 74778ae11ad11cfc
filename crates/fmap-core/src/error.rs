//! Error kinds surfaced by map surface operations.

use crate::geo::ViewId;
use crate::overlay::OverlayKind;
use crate::style::StyleError;

/// Errors returned by surface, option sink, and overlay operations.
///
/// Every error is raised before any state is mutated.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Map initialization failed: {0}")]
    Initialization(String),

    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid path: expected at least 2 points, got {points}")]
    InvalidPath { points: usize },

    #[error("Invalid range for {field}: {reason}")]
    InvalidRange { field: &'static str, reason: String },

    #[error("Invalid camera update: {0}")]
    InvalidCameraUpdate(String),

    #[error("Style parse error: {0}")]
    StyleParse(#[from] StyleError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: OverlayKind, id: String },

    #[error("Map surface {0} has been disposed")]
    Disposed(ViewId),
}

impl MapError {
    /// Stable error code reported across the bridge.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Initialization(_) => "InitializationError",
            Self::InvalidCoordinate { .. } => "InvalidCoordinateError",
            Self::InvalidPath { .. } => "InvalidPathError",
            Self::InvalidRange { .. } => "InvalidRangeError",
            Self::InvalidCameraUpdate(_) => "InvalidCameraUpdateError",
            Self::StyleParse(_) => "StyleParseError",
            Self::NotFound { .. } => "NotFoundError",
            Self::Disposed(_) => "DisposedError",
        }
    }

    pub(crate) fn range(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MapError::NotFound {
            kind: OverlayKind::Marker,
            id: "m0".into(),
        };
        assert_eq!(err.code(), "NotFoundError");
        assert_eq!(err.to_string(), "marker not found: m0");

        let err = MapError::Disposed(ViewId::new(7));
        assert_eq!(err.code(), "DisposedError");
        assert_eq!(err.to_string(), "Map surface View(7) has been disposed");
    }
}
