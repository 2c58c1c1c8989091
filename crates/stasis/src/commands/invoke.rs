//! `stasis invoke <resource> <operation>`: call any described operation.

use serde_json::Value;
use stasis_core::Client;

use crate::cli::{GlobalOpts, InvokeArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: InvokeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let repository = util::repository(client, &args.resource)?;
    let mut params = util::parse_assignments(&args.args)?;

    if let Some(ref key) = args.id {
        let operation = client
            .operation(&args.resource, &args.operation)
            .map_err(|e| util::with_operation_hint(client, e.into()))?;
        // Explicit -a arguments win over the instance key.
        for (name, value) in util::identity_args(&operation.path, key)? {
            params.entry(name).or_insert(value);
        }
    }

    tracing::debug!(
        resource = %args.resource,
        operation = %args.operation,
        params = params.len(),
        "invoking"
    );
    let promoted = repository
        .invoke(&args.operation, Value::Object(params))
        .await
        .map_err(|e| util::with_operation_hint(client, e.into()))?;

    if promoted.is_empty() {
        if !global.quiet {
            eprintln!("✓ {}.{} completed", args.resource, args.operation);
        }
        return Ok(());
    }

    let out = output::render_promoted(&global.output, &promoted, output::should_color(&global.color));
    output::print_output(&out, global.quiet);
    Ok(())
}
