//! `stasis events`: print the event stream as JSON lines.

use std::sync::Arc;

use serde_json::Value;
use stasis_core::{Client, ListenerResult};

use crate::cli::{EventsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: EventsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let quiet = global.quiet;
    let print = move |event: Arc<Value>| async move {
        output::print_output(&output::render_json_compact(&*event), quiet);
        ListenerResult::Ok(())
    };

    if args.types.is_empty() {
        client.on_any_event(print);
    } else {
        for event_type in &args.types {
            client.on_event(event_type, print);
        }
    }

    if !quiet {
        eprintln!("Watching events for {} (Ctrl-C to stop)", client.apps().join(", "));
    }
    let stats = client.run().await?;
    if !quiet {
        eprintln!("Event stream closed after {} messages", stats.messages);
    }
    Ok(())
}
