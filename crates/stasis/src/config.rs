//! CLI-side configuration: profile selection and flag overrides on top of
//! `stasis_config`.
//!
//! Core never sees these types -- it receives a pre-built `ClientConfig`.

use std::time::Duration;

use secrecy::SecretString;

use stasis_config::{Config, Defaults, Profile};
use stasis_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use stasis_config::{config_path, load_config_or_default, save_config};

/// Application used when neither flags nor the profile name one.
pub const DEFAULT_APP: &str = "stasis";

/// Profile selected by `--profile`, falling back to the config default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| cfg.active_profile_name().to_owned())
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, &cfg.defaults);
    }
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    // No profile -- build from flags / env alone
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let (Some(username), Some(password)) = (&global.username, &global.password) else {
        return Err(CliError::NoCredentials {
            profile: profile_name,
        });
    };

    Ok(ClientConfig {
        url: parse_url(url_str)?,
        username: username.clone(),
        password: SecretString::from(password.clone()),
        apps: apps_or_default(&global.apps, &[]),
        tls: if global.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::SystemDefaults
        },
        timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout)),
    })
}

/// Apply CLI flag overrides to a stored profile.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<ClientConfig, CliError> {
    let url = match global.url.as_deref() {
        Some(raw) => parse_url(raw)?,
        None => stasis_config::profile_url(profile)?,
    };
    let password = match &global.password {
        Some(pw) => SecretString::from(pw.clone()),
        None => stasis_config::resolve_password(profile, profile_name)?,
    };
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        stasis_config::profile_tls(profile, defaults)
    };

    Ok(ClientConfig {
        url,
        username: global
            .username
            .clone()
            .unwrap_or_else(|| profile.username.clone()),
        password,
        apps: apps_or_default(&global.apps, &profile.apps),
        tls,
        timeout: Duration::from_secs(
            global
                .timeout
                .or(profile.timeout)
                .unwrap_or(defaults.timeout),
        ),
    })
}

fn apps_or_default(flags: &[String], profile: &[String]) -> Vec<String> {
    if !flags.is_empty() {
        flags.to_vec()
    } else if !profile.is_empty() {
        profile.to_vec()
    } else {
        vec![DEFAULT_APP.to_owned()]
    }
}

fn parse_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["stasis"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["list", "channels"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn profile() -> Profile {
        Profile {
            url: "http://pbx:8088".into(),
            username: "asterisk".into(),
            password: Some("from-profile".into()),
            password_env: None,
            apps: vec!["queue".into()],
            ca_cert: None,
            insecure: None,
            timeout: Some(10),
        }
    }

    #[test]
    fn flags_override_profile_values() {
        let opts = global(&[
            "--url",
            "https://other:8089",
            "--password",
            "from-flag",
            "--app",
            "hello,ivr",
            "--timeout",
            "3",
            "-k",
        ]);
        let config = resolve_profile(&profile(), "lab", &opts, &Defaults::default()).unwrap();

        assert_eq!(config.url.as_str(), "https://other:8089/");
        assert_eq!(config.password.expose_secret(), "from-flag");
        assert_eq!(config.apps, vec!["hello", "ivr"]);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.username, "asterisk");
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let opts = global(&["--password", "pw"]);
        let config = resolve_profile(&profile(), "lab", &opts, &Defaults::default()).unwrap();

        assert_eq!(config.url.as_str(), "http://pbx:8088/");
        assert_eq!(config.apps, vec!["queue"]);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn app_falls_back_to_default() {
        assert_eq!(apps_or_default(&[], &[]), vec![DEFAULT_APP]);
    }
}
