//! Unified error types for passthru.
//!
//! Defines [`ProxyError`] (the main crate error enum) and
//! [`ValidationError`] for config validation failures. Request-cycle
//! variants map to a defined HTTP response through [`IntoResponse`], so
//! every failure while proxying ends in a well-formed reply instead of a
//! dropped connection.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProxyError {
    // -- Startup / CLI --
    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Ping failed with status {0}")]
    PingFailed(StatusCode),

    // -- Request cycle --
    #[error("Invalid JSON request body: {0}")]
    InvalidRequestBody(#[source] serde_json::Error),

    #[error("Method {0} is not proxied")]
    UnsupportedMethod(axum::http::Method),

    #[error("Invalid upstream URI '{uri}': {source}")]
    InvalidUpstreamUri {
        uri: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("Upstream request failed: {source}")]
    Upstream {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Upstream did not respond within {0} ms")]
    UpstreamTimeout(u64),

    #[error("Upstream body could not be decoded: {source}")]
    UpstreamBody {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to build response: {0}")]
    ResponseBuild(#[from] axum::http::Error),
}

impl ProxyError {
    /// Status code returned to the caller when this error ends a request cycle.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMethod(_) => StatusCode::NOT_FOUND,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidUpstreamUri { .. }
            | Self::Upstream { .. }
            | Self::UpstreamBody { .. }
            | Self::ResponseBuild(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}
