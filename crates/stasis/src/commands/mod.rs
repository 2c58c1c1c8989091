//! Command dispatch: bridges CLI args -> core client -> output formatting.

pub mod config_cmd;
pub mod events;
pub mod hello;
pub mod invoke;
pub mod list;
pub mod util;

use stasis_core::Client;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => list::handle(client, args, global).await,
        Command::Invoke(args) => invoke::handle(client, args, global).await,
        Command::Events(args) => events::handle(client, args, global).await,
        Command::Hello(args) => hello::handle(client, args, global).await,
        // Config and Completions are handled before a client exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
