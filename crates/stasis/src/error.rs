//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use stasis_config::ConfigError;
use stasis_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to Asterisk at {url}")]
    #[diagnostic(
        code(stasis::connection_failed),
        help(
            "Check that Asterisk is running with the HTTP server and ARI enabled\n\
             (http.conf `enabled = yes`, ari.conf `enabled = yes`).\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(stasis::auth_failed),
        help(
            "Verify the ARI user and password in ari.conf.\n\
             Run: stasis config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(stasis::no_credentials),
        help(
            "Configure credentials with: stasis config init\n\
             Or pass --username and set STASIS_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources & operations ───────────────────────────────────────

    #[error("Resource '{name}' is not described by this server")]
    #[diagnostic(
        code(stasis::unknown_resource),
        help("Described resources: {available}")
    )]
    UnknownResource { name: String, available: String },

    #[error("Resource '{resource}' has no operation '{operation}'")]
    #[diagnostic(
        code(stasis::unknown_operation),
        help("Operations on {resource}: {available}")
    )]
    UnknownOperation {
        resource: String,
        operation: String,
        available: String,
    },

    #[error("Not found: {message}")]
    #[diagnostic(
        code(stasis::not_found),
        help("The resource may already be gone (a hung-up channel, a finished playback).")
    )]
    NotFound { message: String },

    #[error("Operation failed with HTTP {status}")]
    #[diagnostic(code(stasis::operation_failed), help("Server said: {body}"))]
    OperationFailed { status: u16, body: String },

    #[error(transparent)]
    #[diagnostic(code(stasis::core))]
    Core(CoreError),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(stasis::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(stasis::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: stasis config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(stasis::no_config),
        help(
            "Create a profile with: stasis config init\n\
             Or pass --url and --username. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(stasis::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(stasis::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::UnknownResource { .. }
            | Self::UnknownOperation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { .. } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::OperationFailed { status: 404, body } => CliError::NotFound { message: body },

            CoreError::OperationFailed { status, body } => CliError::OperationFailed { status, body },

            CoreError::UnknownRepository { name } => CliError::UnknownResource {
                name,
                available: String::new(),
            },

            CoreError::UnknownOperation {
                resource,
                operation,
            } => CliError::UnknownOperation {
                resource,
                operation,
                available: String::new(),
            },

            CoreError::InvalidArguments { message } | CoreError::Parameters { message } => {
                CliError::Validation {
                    field: "arguments".into(),
                    reason: message,
                }
            }

            other => CliError::Core(other),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
