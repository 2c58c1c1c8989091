//! `stasis hello`: answer calls entering the application, greet them, and
//! read back any digits pressed. `#` says goodbye and hands the channel
//! back to the dialplan.

use std::sync::Arc;

use serde_json::{Value, json};
use stasis_core::{Client, CoreError, DomainObject, EventObjects};
use tracing::{debug, info};

use crate::cli::{GlobalOpts, HelloArgs};
use crate::error::CliError;

/// Sound to play for one DTMF digit, and whether the call should leave
/// the application afterwards.
pub fn dtmf_response(digit: &str) -> (String, bool) {
    match digit {
        "#" => ("sound:goodbye".into(), true),
        "*" => ("sound:asterisk-friend".into(), false),
        d => (format!("sound:digits/{d}"), false),
    }
}

async fn on_dtmf(objects: EventObjects, event: Arc<Value>) -> Result<(), CoreError> {
    let Some(channel) = objects.into_single() else {
        return Ok(());
    };
    let digit = event["digit"].as_str().unwrap_or_default();
    debug!(channel = %channel.key(), digit, "dtmf received");

    let (media, leave) = dtmf_response(digit);
    channel.invoke("play", json!({ "media": media })).await?;
    if leave {
        channel.invoke("continueInDialplan", Value::Null).await?;
    }
    Ok(())
}

async fn on_start(channel: DomainObject, greeting: String) -> Result<(), CoreError> {
    info!(channel = %channel.key(), "call entered application");
    channel.on_event("ChannelDtmfReceived", on_dtmf)?;
    channel.invoke("answer", Value::Null).await?;
    channel.invoke("play", json!({ "media": greeting })).await?;
    Ok(())
}

pub async fn handle(client: &Client, args: HelloArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let greeting = args.greeting;
    client.on_channel_event("StasisStart", move |objects, _event| {
        // StasisStart carries `channel` and `replace_channel`.
        let channel = objects.get("channel").cloned();
        let greeting = greeting.clone();
        async move {
            match channel {
                Some(channel) => on_start(channel, greeting).await,
                None => Ok(()),
            }
        }
    })?;
    client.on_channel_event("StasisEnd", |objects, _event| async move {
        if let Some(channel) = objects.into_single() {
            info!(channel = %channel.key(), "call left application");
        }
        Ok(())
    })?;

    if !global.quiet {
        eprintln!(
            "Running demo for {} (Ctrl-C to stop)",
            client.apps().join(", ")
        );
    }
    let stats = client.run().await?;
    if !global.quiet {
        eprintln!("Event stream closed after {} messages", stats.messages);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_sounds() {
        assert_eq!(dtmf_response("5"), ("sound:digits/5".to_owned(), false));
        assert_eq!(dtmf_response("*"), ("sound:asterisk-friend".to_owned(), false));
        assert_eq!(dtmf_response("#"), ("sound:goodbye".to_owned(), true));
    }
}
