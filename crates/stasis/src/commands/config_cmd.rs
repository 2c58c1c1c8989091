//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};

use stasis_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, DEFAULT_APP};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn empty_profile() -> Profile {
    Profile {
        url: String::new(),
        username: String::new(),
        password: None,
        password_env: None,
        apps: Vec::new(),
        ca_cert: None,
        insecure: None,
        timeout: None,
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

/// Apply `config set <key> <value>` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "url" => {
            value.parse::<url::Url>().map_err(|_| CliError::Validation {
                field: "url".into(),
                reason: format!("invalid URL: {value}"),
            })?;
            profile.url = value;
        }
        "username" => profile.username = value,
        "password_env" | "password-env" => profile.password_env = Some(value),
        "apps" | "app" => {
            profile.apps = value
                .split(',')
                .map(str::trim)
                .filter(|app| !app.is_empty())
                .map(str::to_owned)
                .collect();
        }
        "insecure" => profile.insecure = Some(parse_bool("insecure", &value)?),
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: url, username, \
                     password_env, apps, insecure, timeout, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                output::render_yaml::<Config>,
                |_| config::config_path().display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(empty_profile);

            set_profile_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: stasis config init");
                return Ok(());
            }
            let default = cfg.active_profile_name();
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort_unstable();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let secret = Password::new()
                .with_prompt("ARI password")
                .interact()
                .map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            stasis_config::store_password(&profile_name, &secret)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("stasis: configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("Server URL")
        .default("http://localhost:8088".into())
        .validate_with(|input: &String| -> Result<(), String> {
            input
                .parse::<url::Url>()
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("ARI username")
        .interact_text()
        .map_err(prompt_err)?;

    let password = Password::new()
        .with_prompt("ARI password")
        .interact()
        .map_err(prompt_err)?;
    if username.is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password_field = if store_selection == 0 {
        stasis_config::store_password(&profile_name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    let app: String = Input::new()
        .with_prompt("Stasis application")
        .default(DEFAULT_APP.into())
        .interact_text()
        .map_err(prompt_err)?;

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            url,
            username,
            password: password_field,
            apps: vec![app],
            ..empty_profile()
        },
    );
    cfg.default_profile = Some(profile_name.clone());
    let written = config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", written.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: stasis list channels");
    Ok(())
}
