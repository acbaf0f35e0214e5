use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read gazetteer file {path}: {source}")]
    GazetteerFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse gazetteer: {0}")]
    GazetteerParse(#[from] serde_yaml::Error),

    #[error("gazetteer validation failed: {0}")]
    Validation(String),
}

/// Failures of the text location parser.
///
/// Only [`LocationError::EmptyInput`] ever reaches callers of
/// [`crate::parse_location`]; `OutOfBounds` is produced while probing the
/// coordinate pattern and makes the parser fall through to its estimate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("location input is empty")]
    EmptyInput,

    #[error("coordinates ({lat}, {lng}) are outside the service area")]
    OutOfBounds { lat: f64, lng: f64 },
}

/// Failures reported by a GPS position source. Never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timed out waiting for a position fix")]
    Timeout,
}

impl GeoError {
    /// Stable machine-readable code, used in API error bodies.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            GeoError::PermissionDenied => "geo_permission_denied",
            GeoError::PositionUnavailable => "geo_unavailable",
            GeoError::Timeout => "geo_timeout",
        }
    }
}
