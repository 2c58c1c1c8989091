use thiserror::Error;

/// Top-level error type for the `stasis-api` crate.
///
/// Covers every failure mode of the transport layer: HTTP, URL handling,
/// TLS setup, API description loading, parameter binding, and the event
/// WebSocket. Non-success HTTP statuses from described operations are
/// *not* errors here -- they are returned as [`RawResponse`](crate::RawResponse)
/// so `stasis-core` can decide how to surface them.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected while loading the API description.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API description ─────────────────────────────────────────────
    /// The Swagger resource listing or an API declaration could not be used.
    #[error("Invalid API description at {location}: {message}")]
    Description { location: String, message: String },

    /// The server answered a description request with a non-success status.
    #[error("Failed to fetch API description {location} (HTTP {status})")]
    DescriptionUnavailable { location: String, status: u16 },

    // ── Parameter binding ───────────────────────────────────────────
    /// A required parameter was not supplied for an operation.
    #[error("Operation '{operation}' requires parameter '{parameter}'")]
    MissingParameter { operation: String, parameter: String },

    /// A parameter was supplied that the operation does not declare.
    #[error("Operation '{operation}' has no parameter named '{parameter}'")]
    UnknownParameter { operation: String, parameter: String },

    /// A parameter value cannot be rendered for its location (path/query).
    #[error("Parameter '{parameter}' of '{operation}' has an unsupported value: {reason}")]
    InvalidParameter {
        operation: String,
        parameter: String,
        reason: String,
    },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the error came from binding caller arguments
    /// to an operation's declared parameters.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. }
                | Self::UnknownParameter { .. }
                | Self::InvalidParameter { .. }
        )
    }
}
