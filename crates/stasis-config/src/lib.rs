//! Shared configuration for stasis tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `stasis_core::ClientConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stasis_core::{ClientConfig, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/password`.
pub const KEYRING_SERVICE: &str = "stasis";

/// Environment variable that overrides every stored password.
pub const PASSWORD_ENV: &str = "STASIS_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles.get(name).ok_or_else(|| ConfigError::UnknownProfile {
            name: name.to_owned(),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named ARI server profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "http://localhost:8088").
    pub url: String,

    /// ARI user from `ari.conf`.
    pub username: String,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Stasis applications to subscribe to.
    #[serde(default)]
    pub apps: Vec<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "stasis", "stasis").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stasis");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered under `STASIS_*` env overrides.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STASIS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the ARI password: `STASIS_PASSWORD`, then the profile's
/// `password_env`, then the keyring, then plaintext config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Global env override
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 2. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password)?;
    Ok(())
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Parse a profile's server URL.
pub fn profile_url(profile: &Profile) -> Result<url::Url, ConfigError> {
    profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })
}

/// TLS mode for a profile: `insecure` wins over `ca_cert`.
pub fn profile_tls(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ClientConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let url = profile_url(profile)?;
    let password = resolve_password(profile, profile_name)?;

    Ok(ClientConfig {
        url,
        username: profile.username.clone(),
        password,
        apps: profile.apps.clone(),
        tls: profile_tls(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile() -> Profile {
        Profile {
            url: "http://localhost:8088".into(),
            username: "asterisk".into(),
            password: Some("plain".into()),
            password_env: None,
            apps: vec!["hello".into()],
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[profiles.lab]
url = "https://pbx.lab:8089"
username = "ari"
apps = ["hello", "queue"]
ca_cert = "/etc/stasis/ca.pem"
timeout = 5
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.active_profile_name(), "lab");
        let lab = config.profile("lab").unwrap();
        assert_eq!(lab.apps, vec!["hello", "queue"]);
        assert_eq!(
            profile_tls(lab, &config.defaults),
            TlsVerification::CustomCa("/etc/stasis/ca.pem".into())
        );
        assert!(matches!(
            config.profile("prod"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.active_profile_name(), "default");
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.timeout, 30);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert("default".into(), profile());

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile("default").unwrap().username, "asterisk");
    }

    #[test]
    fn insecure_overrides_custom_ca() {
        let mut p = profile();
        p.ca_cert = Some("/etc/ca.pem".into());
        p.insecure = Some(true);
        assert_eq!(
            profile_tls(&p, &Defaults::default()),
            TlsVerification::DangerAcceptInvalid
        );
    }

    #[test]
    fn client_config_from_profile() {
        let p = profile();
        let config = profile_to_client_config(&p, "unit-test-profile", &Defaults::default()).unwrap();

        assert_eq!(config.url.as_str(), "http://localhost:8088/");
        assert_eq!(config.username, "asterisk");
        assert_eq!(config.apps, vec!["hello"]);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
        // Falls through to plaintext when nothing else is configured.
        if std::env::var(PASSWORD_ENV).is_err() {
            assert_eq!(config.password.expose_secret(), "plain");
        }
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let mut p = profile();
        p.url = "not a url".into();
        let err = profile_url(&p).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));
    }
}
