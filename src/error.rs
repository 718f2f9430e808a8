//! Error type shared by registration, request parsing and the bundled delegates.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

// Error categories:
// - registration time: MissingDependency, RouteConflict
// - client input, raised before any delegate runs: MissingParameter, InvalidParameter,
//   InvalidDatetime
// - delegate failures, passed through untouched: everything else
/// Every failure the crate reports, from registration to delegate I/O
#[derive(Error, Debug)]
pub enum Error {
    /// An extension was registered without its optional capability
    #[error("'{dependency}' must be enabled to use {extension}")]
    MissingDependency {
        /// Extension that refused to register
        extension:  &'static str,
        /// Cargo feature or capability it needs
        dependency: &'static str,
    },

    /// The factory already holds a route with this method and path
    #[error("Route already registered: {method} {path}")]
    RouteConflict {
        /// HTTP method
        method: String,
        /// Full path, prefix included
        path:   String,
    },

    /// A required query parameter is absent or empty
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// A query parameter could not be parsed or is out of range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Query parameter name
        name:   String,
        /// What is wrong with the value
        reason: String,
    },

    /// The `datetime` parameter is not an accepted date, datetime or range
    #[error("Invalid datetime '{value}': {reason}")]
    InvalidDatetime {
        /// Raw parameter value
        value:  String,
        /// What is wrong with it
        reason: String,
    },

    /// The source does not exist
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// A remote source could not be fetched
    #[error("Failed to fetch remote source {url}: {reason}")]
    RemoteSource {
        /// Requested URL
        url:    String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// The source is not a readable TIFF
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    /// The source is a TIFF this crate cannot handle, or is too large
    #[error("Unsupported raster: {0}")]
    UnsupportedRaster(String),

    /// Bounds could not be reprojected
    #[error("Projection failed: {0}")]
    Projection(String),

    /// Local file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A blocking delegate task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name:   name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::InvalidDatetime`]
    pub fn invalid_datetime(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDatetime {
            value:  value.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the request rather than the server or the source
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_) | Self::InvalidParameter { .. } | Self::InvalidDatetime { .. }
        )
    }

    /// HTTP status used when this error reaches a handler boundary
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_)
            | Self::InvalidParameter { .. }
            | Self::InvalidDatetime { .. } => StatusCode::BAD_REQUEST,
            Self::SourceNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRaster(_) | Self::UnsupportedRaster(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::RemoteSource { .. } => StatusCode::BAD_GATEWAY,
            Self::MissingDependency { .. }
            | Self::RouteConflict { .. }
            | Self::Projection(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// Conversion to an HTTP response at the handler boundary
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{self}");
        } else {
            tracing::debug!(status = status.as_u16(), "{self}");
        }

        let body = serde_json::json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}
