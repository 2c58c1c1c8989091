// ── Runtime connection configuration ──
//
// These types describe *how* to connect to an Asterisk ARI server.
// They carry credential data and connection tuning, but never touch disk.
// The CLI constructs a `ClientConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use stasis_api::TlsMode;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab servers). REST calls only.
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for connecting to a single ARI server.
///
/// Built by the CLI, passed to `Client::connect` -- core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server URL (e.g., `http://localhost:8088`).
    pub url: Url,
    /// ARI user from `ari.conf`.
    pub username: String,
    pub password: SecretString,
    /// Stasis applications to subscribe to on the event stream.
    pub apps: Vec<String>,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        url: Url,
        username: impl Into<String>,
        password: impl Into<String>,
        apps: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            url,
            username: username.into(),
            password: SecretString::from(password.into()),
            apps: apps.into_iter().map(Into::into).collect(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_strict_tls_and_default_timeout() {
        let config = ClientConfig::new(
            Url::parse("http://localhost:8088").unwrap(),
            "asterisk",
            "asterisk",
            ["hello"],
        );
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.apps, vec!["hello".to_owned()]);
    }

    #[test]
    fn tls_maps_to_transport_mode() {
        let mode = TlsMode::from(&TlsVerification::CustomCa("/etc/ca.pem".into()));
        assert!(matches!(mode, TlsMode::CustomCa(ref p) if p.to_str() == Some("/etc/ca.pem")));
    }
}
