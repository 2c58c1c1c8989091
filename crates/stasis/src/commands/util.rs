//! Shared helpers for command handlers.

use serde_json::{Map, Value};
use stasis_core::{Client, CoreError, Repository};

use crate::error::CliError;

/// Look up a repository, listing the described resources on failure.
pub fn repository(client: &Client, name: &str) -> Result<Repository, CliError> {
    client.repository(name).map_err(|err| match err {
        CoreError::UnknownRepository { name } => {
            let mut names: Vec<&str> = client.description().resource_names().collect();
            names.sort_unstable();
            CliError::UnknownResource {
                name,
                available: names.join(", "),
            }
        }
        other => other.into(),
    })
}

/// Add the resource's operation nicknames to an unknown-operation error.
pub fn with_operation_hint(client: &Client, err: CliError) -> CliError {
    match err {
        CliError::UnknownOperation {
            resource,
            operation,
            ..
        } => {
            let available = client
                .description()
                .resource(&resource)
                .map(|api| {
                    api.operations()
                        .map(|op| op.nickname.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            CliError::UnknownOperation {
                resource,
                operation,
                available,
            }
        }
        other => other,
    }
}

/// Parse repeated `name=value` arguments into an operation argument object.
///
/// Values that parse as JSON (numbers, booleans, objects, arrays) are kept
/// as such; anything else is a string.
pub fn parse_assignments(raw: &[String]) -> Result<Map<String, Value>, CliError> {
    let mut args = Map::new();
    for item in raw {
        let (name, value) = item.split_once('=').ok_or_else(|| CliError::Validation {
            field: "arg".into(),
            reason: format!("expected NAME=VALUE, got '{item}'"),
        })?;
        if name.is_empty() {
            return Err(CliError::Validation {
                field: "arg".into(),
                reason: format!("missing name in '{item}'"),
            });
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
        args.insert(name.to_owned(), value);
    }
    Ok(args)
}

/// Names of the `{placeholders}` in a path template, in order.
pub fn path_placeholders(template: &str) -> Vec<&str> {
    template
        .split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .collect()
}

/// Spread an instance key over path parameters: `c1` fills the only
/// placeholder, `PJSIP/alice` fills `tech` and `resource`. The last
/// placeholder takes any remainder.
pub fn identity_args(template: &str, key: &str) -> Result<Map<String, Value>, CliError> {
    let names = path_placeholders(template);
    if names.is_empty() {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: format!("operation path '{template}' takes no instance"),
        });
    }
    let parts: Vec<&str> = key.splitn(names.len(), '/').collect();
    if parts.len() != names.len() {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: format!("'{key}' does not fill {}", names.join(", ")),
        });
    }
    Ok(names
        .into_iter()
        .zip(parts)
        .map(|(name, part)| (name.to_owned(), Value::String(part.to_owned())))
        .collect())
}
