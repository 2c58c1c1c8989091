//! Clap derive structures for the `stasis` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// stasis -- drive Asterisk through ARI from the command line
#[derive(Debug, Parser)]
#[command(
    name = "stasis",
    version,
    about = "Control Asterisk through the REST Interface (ARI)",
    long_about = "Inspect resources, invoke any described ARI operation, and watch\n\
        the Stasis event stream of an Asterisk server.\n\n\
        Operations are discovered from the server's own API description,\n\
        so every resource and operation it documents is available.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "STASIS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL, e.g. http://localhost:8088 (overrides profile)
    #[arg(long, short = 'u', env = "STASIS_URL", global = true)]
    pub url: Option<String>,

    /// ARI username (overrides profile)
    #[arg(long, env = "STASIS_USERNAME", global = true)]
    pub username: Option<String>,

    /// ARI password
    #[arg(long, env = "STASIS_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Stasis application to subscribe to (repeatable)
    #[arg(long = "app", short = 'A', env = "STASIS_APP", global = true, value_delimiter = ',')]
    pub apps: Vec<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STASIS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "STASIS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "STASIS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one key per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the instances of a resource (channels, bridges, endpoints, ...)
    #[command(alias = "ls")]
    List(ListArgs),

    /// Invoke any operation the server describes
    #[command(alias = "call")]
    Invoke(InvokeArgs),

    /// Print the event stream as JSON lines
    Events(EventsArgs),

    /// Run the DTMF echo demo application
    Hello(HelloArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Resource name as described by the server (e.g. channels, bridges)
    pub resource: String,
}

#[derive(Debug, Args)]
pub struct InvokeArgs {
    /// Resource name (e.g. channels)
    pub resource: String,

    /// Operation nickname (e.g. answer, play, originate)
    pub operation: String,

    /// Instance key; fills the operation's path parameters
    /// (`c1` → channelId, `PJSIP/alice` → tech + resource)
    #[arg(long)]
    pub id: Option<String>,

    /// Operation argument as name=value (repeatable; JSON values accepted)
    #[arg(long = "arg", short = 'a', value_name = "NAME=VALUE")]
    pub args: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Only print these event types (repeatable)
    #[arg(long = "type", short = 't', value_name = "EVENT_TYPE")]
    pub types: Vec<String>,
}

#[derive(Debug, Args)]
pub struct HelloArgs {
    /// Sound played when a call enters the application
    #[arg(long, default_value = "sound:hello-world")]
    pub greeting: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a profile value
    Set {
        /// Profile key (url, username, password_env, apps, insecure, timeout, ca_cert)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
