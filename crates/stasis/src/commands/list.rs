//! `stasis list <resource>`.

use stasis_core::Client;

use crate::cli::{GlobalOpts, ListArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let repository = util::repository(client, &args.resource)?;
    let promoted = repository
        .list()
        .await
        .map_err(|e| util::with_operation_hint(client, e.into()))?;

    let out = output::render_promoted(&global.output, &promoted, output::should_color(&global.color));
    output::print_output(&out, global.quiet);
    Ok(())
}
