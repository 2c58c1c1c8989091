// ── Operation proxy ──
//
// Resource collections and instances forward named operations to the
// capability table built from the API description. A name the table does
// not declare is `UnknownOperation`, never an HTTP call.

use serde_json::Value;
use stasis_api::{Operation, Params};
use tracing::debug;

use crate::client::Client;
use crate::error::CoreError;
use crate::promote::{Promoted, promote};

/// Collection-level proxy for one resource (`channels`, `bridges`, ...).
#[derive(Debug, Clone)]
pub struct Repository {
    client: Client,
    name: String,
}

impl Repository {
    pub(crate) fn new(client: Client, name: &str) -> Self {
        Self {
            client,
            name: name.to_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nicknames of every operation this resource declares.
    pub fn operation_names(&self) -> Vec<&str> {
        self.client
            .description()
            .resource(&self.name)
            .map(|resource| resource.operations().map(|op| op.nickname.as_str()).collect())
            .unwrap_or_default()
    }

    /// Forward `operation` with `args` (a JSON object or `null`) and
    /// promote the result.
    pub async fn invoke(&self, operation: &str, args: Value) -> Result<Promoted, CoreError> {
        let op = self.client.operation(&self.name, operation)?;
        self.client.invoke_operation(op, args_to_params(args)?).await
    }

    /// Shorthand for the `list` operation.
    pub async fn list(&self) -> Result<Promoted, CoreError> {
        self.invoke("list", Value::Null).await
    }
}

impl Client {
    /// Look up an operation in the capability table.
    pub fn operation(&self, resource: &str, nickname: &str) -> Result<&Operation, CoreError> {
        let api = self
            .description()
            .resource(resource)
            .ok_or_else(|| CoreError::UnknownRepository {
                name: resource.to_owned(),
            })?;
        api.operation(nickname)
            .ok_or_else(|| CoreError::UnknownOperation {
                resource: resource.to_owned(),
                operation: nickname.to_owned(),
            })
    }

    /// Send a described operation and promote its response.
    pub async fn invoke_operation(
        &self,
        operation: &Operation,
        params: Params,
    ) -> Result<Promoted, CoreError> {
        debug!(operation = %operation.nickname, params = params.len(), "invoking operation");
        let response = self.http().invoke(operation, &params).await?;
        promote(self, response, &operation.response_class)
    }
}

/// Operation arguments from a JSON value. `null` means no arguments, and
/// `null` members are treated as absent.
pub(crate) fn args_to_params(args: Value) -> Result<Params, CoreError> {
    match args {
        Value::Null => Ok(Params::new()),
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => Err(CoreError::InvalidArguments {
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}
