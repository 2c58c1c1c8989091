// ── Response promotion ──
//
// Turns a raw operation result into domain objects using the declared
// response descriptor (`T` or `List[T]`) and the type registry. Order of
// checks: failure status, then no-content, then registry lookup. Types the
// registry does not know pass through as plain JSON.

use std::sync::Arc;

use serde_json::Value;
use stasis_api::RawResponse;
use tracing::debug;

use crate::client::Client;
use crate::error::CoreError;
use crate::model::DomainObject;
use crate::registry::ModelKind;

/// Outcome of promoting one operation result.
#[derive(Debug, Clone, PartialEq)]
pub enum Promoted {
    /// The server sent no content.
    Empty,
    Object(DomainObject),
    List(Vec<DomainObject>),
    /// Response type has no registered kind; decoded JSON, untouched.
    Json(Value),
}

impl Promoted {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn into_object(self) -> Option<DomainObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Objects as a list; a single object becomes a one-element list.
    pub fn into_list(self) -> Vec<DomainObject> {
        match self {
            Self::Object(object) => vec![object],
            Self::List(objects) => objects,
            Self::Empty | Self::Json(_) => Vec::new(),
        }
    }

    /// JSON view of any outcome; `Empty` becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Object(object) => object.json().clone(),
            Self::List(objects) => {
                Value::Array(objects.iter().map(|o| o.json().clone()).collect())
            }
            Self::Json(value) => value,
        }
    }
}

/// Split a response descriptor into `(type name, is_list)`.
pub fn parse_descriptor(descriptor: &str) -> (&str, bool) {
    let trimmed = descriptor.trim();
    match trimmed
        .strip_prefix("List[")
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => (inner.trim(), true),
        None => (trimmed, false),
    }
}

/// Promote a raw operation response.
pub(crate) fn promote(
    client: &Client,
    response: RawResponse,
    descriptor: &str,
) -> Result<Promoted, CoreError> {
    if !response.is_success() {
        return Err(CoreError::OperationFailed {
            status: response.status,
            body: response.body.unwrap_or_default(),
        });
    }
    if response.is_no_content() {
        return Ok(Promoted::Empty);
    }
    let body = response.body.unwrap_or_default();
    let (type_name, is_list) = parse_descriptor(descriptor);

    let Some(kind) = client.model_kind(type_name) else {
        debug!(type_name, "no model registered, passing JSON through");
        let value = serde_json::from_str(&body).unwrap_or(Value::String(body));
        return Ok(Promoted::Json(value));
    };

    let value: Value = serde_json::from_str(&body).map_err(|e| CoreError::Deserialization {
        message: format!("{type_name} response is not JSON: {e}"),
        body: body.clone(),
    })?;
    promote_value(client, &kind, value, is_list)
}

pub(crate) fn promote_value(
    client: &Client,
    kind: &Arc<ModelKind>,
    value: Value,
    is_list: bool,
) -> Result<Promoted, CoreError> {
    let weak = client.downgrade();
    if !is_list {
        return DomainObject::new(weak, Arc::clone(kind), value).map(Promoted::Object);
    }
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| DomainObject::new(weak.clone(), Arc::clone(kind), item))
            .collect::<Result<Vec<_>, _>>()
            .map(Promoted::List),
        other => Err(CoreError::Deserialization {
            message: format!("expected a list of {}", kind.name()),
            body: other.to_string(),
        }),
    }
}

impl Client {
    /// Promote a JSON value according to `descriptor` (`T` or `List[T]`).
    ///
    /// Unregistered types come back as [`Promoted::Json`].
    pub fn promote(&self, descriptor: &str, json: Value) -> Result<Promoted, CoreError> {
        let (type_name, is_list) = parse_descriptor(descriptor);
        match self.model_kind(type_name) {
            Some(kind) => promote_value(self, &kind, json, is_list),
            None => Ok(Promoted::Json(json)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_grammar() {
        assert_eq!(parse_descriptor("Channel"), ("Channel", false));
        assert_eq!(parse_descriptor("List[Bridge]"), ("Bridge", true));
        assert_eq!(parse_descriptor(" List[ Sound ] "), ("Sound", true));
        assert_eq!(parse_descriptor("void"), ("void", false));
        assert_eq!(parse_descriptor("List[Channel"), ("List[Channel", false));
    }

    #[test]
    fn into_list_flattens_shapes() {
        assert!(Promoted::Empty.into_list().is_empty());
        assert!(Promoted::Json(Value::Null).into_list().is_empty());
        assert_eq!(Promoted::Empty.into_json(), Value::Null);
    }
}
