// ── Object identity strategies ──
//
// Every resource kind knows how to read its natural key out of a JSON
// snapshot, and which operation parameters address that instance. Most
// ARI resources use a single `id` (or `name`) field; endpoints use the
// composite `technology/resource` pair.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stasis_api::Params;

use crate::error::CoreError;

// ── ObjectKey ───────────────────────────────────────────────────────

/// Stable, comparable identity of one resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ObjectKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for ObjectKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ObjectKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ── ObjectIdentifier ────────────────────────────────────────────────

/// Identity capability of a resource kind.
///
/// Implementations must be pure: the same snapshot always yields the same
/// key, and two snapshots of the same resource yield equal keys.
pub trait ObjectIdentifier: fmt::Debug + Send + Sync {
    /// The natural key of the resource described by `json`.
    fn key(&self, kind: &str, json: &Value) -> Result<ObjectKey, CoreError>;

    /// Parameters that address this instance in an operation call.
    fn operation_params(&self, kind: &str, json: &Value) -> Result<Params, CoreError>;
}

/// Read an identifying field as a string; numbers are accepted verbatim.
fn identifying_field(kind: &str, json: &Value, field: &str) -> Result<String, CoreError> {
    match json.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(_)) => Err(CoreError::MalformedResource {
            kind: kind.to_owned(),
            reason: format!("identifying field '{field}' is empty"),
        }),
        Some(other) if !other.is_null() => Err(CoreError::MalformedResource {
            kind: kind.to_owned(),
            reason: format!("identifying field '{field}' is not a string: {other}"),
        }),
        _ => Err(CoreError::MalformedResource {
            kind: kind.to_owned(),
            reason: format!("missing identifying field '{field}'"),
        }),
    }
}

// ── Single-field identity ───────────────────────────────────────────

/// Identity carried by one field, passed to operations under another name
/// (`id` → `channelId`, `name` → `recordingName`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIdentifier {
    field: String,
    param: String,
}

impl FieldIdentifier {
    pub fn new(field: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            param: param.into(),
        }
    }

    /// The common case: key in `id`, operations take `param`.
    pub fn id(param: impl Into<String>) -> Self {
        Self::new("id", param)
    }
}

impl ObjectIdentifier for FieldIdentifier {
    fn key(&self, kind: &str, json: &Value) -> Result<ObjectKey, CoreError> {
        identifying_field(kind, json, &self.field).map(ObjectKey)
    }

    fn operation_params(&self, kind: &str, json: &Value) -> Result<Params, CoreError> {
        let value = identifying_field(kind, json, &self.field)?;
        let mut params = Params::new();
        params.insert(self.param.clone(), Value::String(value));
        Ok(params)
    }
}

// ── Composite identity ──────────────────────────────────────────────

/// Identity spread over several fields.
///
/// The key joins the field values with `/` (`"PJSIP/alice"`); operations
/// receive each value as its own parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeIdentifier {
    /// `(json field, operation parameter)` pairs, in key order.
    parts: Vec<(String, String)>,
}

impl CompositeIdentifier {
    pub fn new<F, P>(parts: impl IntoIterator<Item = (F, P)>) -> Self
    where
        F: Into<String>,
        P: Into<String>,
    {
        Self {
            parts: parts
                .into_iter()
                .map(|(field, param)| (field.into(), param.into()))
                .collect(),
        }
    }

    /// ARI endpoints: `technology` + `resource`, addressed as `tech` + `resource`.
    pub fn endpoint() -> Self {
        Self::new([("technology", "tech"), ("resource", "resource")])
    }
}

impl ObjectIdentifier for CompositeIdentifier {
    fn key(&self, kind: &str, json: &Value) -> Result<ObjectKey, CoreError> {
        let values = self
            .parts
            .iter()
            .map(|(field, _)| identifying_field(kind, json, field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ObjectKey(values.join("/")))
    }

    fn operation_params(&self, kind: &str, json: &Value) -> Result<Params, CoreError> {
        let mut params = Params::new();
        for (field, param) in &self.parts {
            let value = identifying_field(kind, json, field)?;
            params.insert(param.clone(), Value::String(value));
        }
        Ok(params)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn field_identifier_reads_id() {
        let ident = FieldIdentifier::id("channelId");
        let json = json!({"id": "1400000000.12", "name": "PJSIP/alice-0001", "state": "Up"});

        assert_eq!(ident.key("Channel", &json).unwrap(), "1400000000.12");
        let params = ident.operation_params("Channel", &json).unwrap();
        assert_eq!(Value::Object(params), json!({"channelId": "1400000000.12"}));
    }

    #[test]
    fn field_identifier_ignores_unrelated_fields() {
        let ident = FieldIdentifier::id("bridgeId");
        let a = json!({"id": "b1", "bridge_type": "mixing", "channels": []});
        let b = json!({"id": "b1", "bridge_type": "mixing", "channels": ["c1", "c2"]});
        assert_eq!(ident.key("Bridge", &a).unwrap(), ident.key("Bridge", &b).unwrap());
    }

    #[test]
    fn missing_field_is_malformed() {
        let ident = FieldIdentifier::id("channelId");
        let err = ident.key("Channel", &json!({"name": "x"})).unwrap_err();
        assert!(
            matches!(err, CoreError::MalformedResource { ref kind, .. } if kind == "Channel"),
            "got {err:?}"
        );
        assert!(ident.key("Channel", &json!({"id": null})).is_err());
        assert!(ident.key("Channel", &json!({"id": ""})).is_err());
        assert!(ident.key("Channel", &json!({"id": {"nested": 1}})).is_err());
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let ident = FieldIdentifier::id("soundId");
        assert_eq!(ident.key("Sound", &json!({"id": 42})).unwrap(), "42");
    }

    #[test]
    fn composite_identifier_joins_key_and_splits_params() {
        let ident = CompositeIdentifier::endpoint();
        let json = json!({"technology": "PJSIP", "resource": "alice", "state": "online"});

        assert_eq!(ident.key("Endpoint", &json).unwrap(), "PJSIP/alice");
        let params = ident.operation_params("Endpoint", &json).unwrap();
        assert_eq!(
            Value::Object(params),
            json!({"tech": "PJSIP", "resource": "alice"})
        );
    }

    #[test]
    fn composite_identifier_requires_every_part() {
        let ident = CompositeIdentifier::endpoint();
        let err = ident.key("Endpoint", &json!({"technology": "PJSIP"})).unwrap_err();
        assert!(matches!(err, CoreError::MalformedResource { .. }), "got {err:?}");
    }

    #[test]
    fn custom_composite_parts_are_ordered() {
        let ident = CompositeIdentifier::new([("context", "context"), ("exten", "extension")]);
        let json = json!({"exten": "100", "context": "default"});
        assert_eq!(ident.key("Dialplan", &json).unwrap(), "default/100");
    }
}
