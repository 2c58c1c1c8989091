// ── Core error types ──
//
// Errors surfaced by the promotion engine, the operation proxy, and
// listener registration. Delivery-time failures (a listener returning an
// error, a malformed event message) are never returned from `run`; they
// are logged and counted in `RunStats` instead.
// The `From<stasis_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Promotion ────────────────────────────────────────────────────
    /// A payload lacks the fields its identifier strategy requires.
    #[error("Malformed {kind} resource: {reason}")]
    MalformedResource { kind: String, reason: String },

    // ── Operations ───────────────────────────────────────────────────
    /// The server answered an operation with a non-success status.
    #[error("Operation failed with HTTP {status}: {body}")]
    OperationFailed { status: u16, body: String },

    /// The API description does not declare this operation.
    #[error("Resource '{resource}' has no operation '{operation}'")]
    UnknownOperation { resource: String, operation: String },

    /// The API description does not declare this resource.
    #[error("Unknown resource '{name}'")]
    UnknownRepository { name: String },

    /// Operation arguments were not a JSON object.
    #[error("Invalid operation arguments: {message}")]
    InvalidArguments { message: String },

    /// A successful response did not have the expected shape.
    #[error("Unexpected response from '{operation}': {message}")]
    UnexpectedResponse { operation: String, message: String },

    // ── Registration ─────────────────────────────────────────────────
    /// No event model is described for this event type.
    #[error("Cannot find event model '{event_type}'")]
    UnknownEventModel { event_type: String },

    /// The event model has no field of the requested kind.
    #[error("Event model '{event_type}' has no fields of type {kind}")]
    NoMatchingField { event_type: String, kind: String },

    /// The type registry has no model kind of this name.
    #[error("No model kind registered for '{kind}'")]
    UnknownModel { kind: String },

    /// The owning client was dropped while an object was still in use.
    #[error("Client has been shut down")]
    ClientClosed,

    // ── Listeners ────────────────────────────────────────────────────
    /// Raised by application listeners to report a handled failure.
    #[error("Listener failed: {message}")]
    Listener { message: String },

    // ── Transport (wrapped, not exposed raw) ─────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid API description: {message}")]
    Description { message: String },

    #[error("Invalid operation parameters: {message}")]
    Parameters { message: String },

    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Convenience for application listeners.
    pub fn listener(message: impl Into<String>) -> Self {
        Self::Listener {
            message: message.into(),
        }
    }

    /// The HTTP status of a failed operation, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::OperationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for a `404` from the server -- typically a channel
    /// that hung up before the operation reached it.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<stasis_api::Error> for CoreError {
    fn from(err: stasis_api::Error) -> Self {
        match err {
            stasis_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            stasis_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            stasis_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            stasis_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            stasis_api::Error::Description { location, message } => CoreError::Description {
                message: format!("{location}: {message}"),
            },
            stasis_api::Error::DescriptionUnavailable { location, status } => {
                CoreError::Description {
                    message: format!("{location} returned HTTP {status}"),
                }
            }
            e @ (stasis_api::Error::MissingParameter { .. }
            | stasis_api::Error::UnknownParameter { .. }
            | stasis_api::Error::InvalidParameter { .. }) => CoreError::Parameters {
                message: e.to_string(),
            },
            stasis_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            stasis_api::Error::Deserialization { message, body } => {
                CoreError::Deserialization { message, body }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_a_failed_operation_with_404() {
        let err = CoreError::OperationFailed {
            status: 404,
            body: r#"{"message":"Channel not found"}"#.into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert!(!CoreError::ClientClosed.is_not_found());
    }

    #[test]
    fn parameter_errors_translate() {
        let err: CoreError = stasis_api::Error::MissingParameter {
            operation: "play".into(),
            parameter: "media".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Parameters { .. }), "got {err:?}");
    }
}
