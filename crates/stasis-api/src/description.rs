//! Pre-parsed view of the server's Swagger 1.2 API description.
//!
//! ARI publishes a resource listing at `/ari/api-docs/resources.json` that
//! points at one API declaration per resource (`channels.json`,
//! `bridges.json`, ...). Each declaration lists HTTP operations with a
//! `nickname`, declared parameters, and a `responseClass` such as
//! `"Channel"` or `"List[Bridge]"`. The `events` declaration additionally
//! carries the event models: for every event type, which fields hold
//! which model type.
//!
//! This module only models that metadata. Fetching lives in
//! [`AriHttp::load_description`](crate::AriHttp::load_description).

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Error;

/// Name of the declaration whose models describe event payloads.
pub const EVENTS_RESOURCE: &str = "events";

// ── Parameters ──────────────────────────────────────────────────────

/// Where a parameter travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Path,
    Query,
    Body,
    Header,
    Form,
}

/// One declared operation parameter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub param_type: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub data_type: Option<String>,
}

// ── Operations ──────────────────────────────────────────────────────

/// A described HTTP operation, addressable by its nickname.
#[derive(Debug, Clone)]
pub struct Operation {
    pub nickname: String,
    /// Upper-case HTTP verb (`GET`, `POST`, ...).
    pub http_method: String,
    /// Path template relative to the API root, e.g. `/channels/{channelId}`.
    pub path: String,
    /// Response type descriptor: `T`, `List[T]`, or `void`.
    pub response_class: String,
    pub parameters: Vec<Parameter>,
    /// `Some("websocket")` for the event stream endpoint.
    pub upgrade: Option<String>,
}

impl Operation {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }
}

/// All operations of one resource, keyed by nickname.
#[derive(Debug, Clone, Default)]
pub struct ResourceApi {
    pub name: String,
    operations: BTreeMap<String, Operation>,
}

impl ResourceApi {
    pub fn operation(&self, nickname: &str) -> Option<&Operation> {
        self.operations.get(nickname)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }
}

// ── Event models ────────────────────────────────────────────────────

/// Declared type of one model property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PropertyModel {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
}

/// Per-event-type description: declared fields and their type names.
///
/// Property order follows the declaration, so dispatch visits fields in
/// the order the server documents them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventModel {
    pub properties: IndexMap<String, PropertyModel>,
}

impl EventModel {
    /// Names of the fields whose declared type is exactly `type_name`.
    pub fn fields_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a str> {
        self.properties
            .iter()
            .filter(move |(_, prop)| prop.type_name == type_name)
            .map(|(name, _)| name.as_str())
    }
}

// ── Raw Swagger shapes ──────────────────────────────────────────────

/// Top-level `resources.json` listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListing {
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub apis: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ListingEntry {
    pub path: String,
}

/// One API declaration document (`channels.json`, `events.json`, ...).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDeclaration {
    #[serde(default)]
    pub resource_path: Option<String>,
    #[serde(default)]
    pub apis: Vec<RawApi>,
    #[serde(default)]
    pub models: HashMap<String, RawModel>,
}

#[derive(Debug, Deserialize)]
pub struct RawApi {
    pub path: String,
    #[serde(default)]
    pub operations: Vec<RawOperation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub http_method: String,
    pub nickname: String,
    #[serde(default = "void_class")]
    pub response_class: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub upgrade: Option<String>,
}

fn void_class() -> String {
    "void".into()
}

#[derive(Debug, Deserialize)]
pub struct RawModel {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyModel>,
}

impl ResourceListing {
    pub fn from_json(location: &str, text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::Description {
            location: location.into(),
            message: e.to_string(),
        })
    }
}

impl ApiDeclaration {
    pub fn from_json(location: &str, text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::Description {
            location: location.into(),
            message: e.to_string(),
        })
    }

    /// Resource name derived from `resourcePath`:
    /// `/api-docs/channels.{format}` → `channels`.
    pub fn resource_name(&self) -> Option<String> {
        self.resource_path.as_deref().map(resource_name_from_path)
    }
}

/// Strip directories and the `.{format}` / `.json` suffix from a declaration path.
pub fn resource_name_from_path(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file
        .strip_suffix(".{format}")
        .or_else(|| file.strip_suffix(".json"))
        .unwrap_or(file);
    stem.to_owned()
}

// ── ApiDescription ──────────────────────────────────────────────────

/// The explicit capability table built once from all declarations.
#[derive(Debug, Clone, Default)]
pub struct ApiDescription {
    resources: BTreeMap<String, ResourceApi>,
    event_models: HashMap<String, EventModel>,
}

impl ApiDescription {
    /// Build the capability table from `(resource name, declaration)` pairs.
    ///
    /// Event models are taken from the declaration named `events`, with
    /// `extends` chains flattened so inherited fields are visible.
    pub fn from_declarations(
        declarations: impl IntoIterator<Item = (String, ApiDeclaration)>,
    ) -> Self {
        let mut description = Self::default();

        for (name, declaration) in declarations {
            let mut resource = ResourceApi {
                name: name.clone(),
                operations: BTreeMap::new(),
            };
            for api in &declaration.apis {
                for op in &api.operations {
                    resource.operations.insert(
                        op.nickname.clone(),
                        Operation {
                            nickname: op.nickname.clone(),
                            http_method: op.http_method.to_ascii_uppercase(),
                            path: api.path.clone(),
                            response_class: op.response_class.clone(),
                            parameters: op.parameters.clone(),
                            upgrade: op.upgrade.clone(),
                        },
                    );
                }
            }

            if name == EVENTS_RESOURCE {
                description.event_models = flatten_models(&declaration.models);
            }
            description.resources.insert(name, resource);
        }

        description
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceApi> {
        self.resources.get(name)
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn event_model(&self, event_type: &str) -> Option<&EventModel> {
        self.event_models.get(event_type)
    }

    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.event_models.keys().map(String::as_str)
    }
}

/// Resolve `extends` chains, parent properties first.
fn flatten_models(models: &HashMap<String, RawModel>) -> HashMap<String, EventModel> {
    models
        .keys()
        .map(|name| {
            let mut chain = Vec::new();
            let mut cursor = Some(name.as_str());
            while let Some(current) = cursor {
                // Guard against cyclic `extends`.
                if chain.contains(&current) {
                    break;
                }
                chain.push(current);
                cursor = models.get(current).and_then(|m| m.extends.as_deref());
            }

            let mut properties = IndexMap::new();
            for model_name in chain.iter().rev() {
                if let Some(model) = models.get(*model_name) {
                    for (field, prop) in &model.properties {
                        properties.insert(field.clone(), prop.clone());
                    }
                }
            }
            (name.clone(), EventModel { properties })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn declaration(value: &serde_json::Value) -> ApiDeclaration {
        serde_json::from_value(value.clone()).unwrap()
    }

    #[test]
    fn resource_name_strips_format_suffix() {
        assert_eq!(resource_name_from_path("/api-docs/channels.{format}"), "channels");
        assert_eq!(resource_name_from_path("/api-docs/deviceStates.json"), "deviceStates");
        assert_eq!(resource_name_from_path("bridges"), "bridges");
    }

    #[test]
    fn operations_are_indexed_by_nickname() {
        let channels = declaration(&json!({
            "resourcePath": "/api-docs/channels.{format}",
            "apis": [
                {
                    "path": "/channels",
                    "operations": [
                        {"httpMethod": "GET", "nickname": "list", "responseClass": "List[Channel]"}
                    ]
                },
                {
                    "path": "/channels/{channelId}/answer",
                    "operations": [{
                        "httpMethod": "post",
                        "nickname": "answer",
                        "parameters": [
                            {"name": "channelId", "paramType": "path", "required": true, "dataType": "string"}
                        ]
                    }]
                }
            ]
        }));
        assert_eq!(channels.resource_name().as_deref(), Some("channels"));

        let description = ApiDescription::from_declarations([("channels".to_owned(), channels)]);
        let resource = description.resource("channels").unwrap();

        let list = resource.operation("list").unwrap();
        assert_eq!(list.response_class, "List[Channel]");
        assert_eq!(list.path, "/channels");

        let answer = resource.operation("answer").unwrap();
        assert_eq!(answer.http_method, "POST");
        assert_eq!(answer.response_class, "void");
        assert!(answer.declares("channelId"));
        assert!(resource.operation("hangupEverything").is_none());
    }

    #[test]
    fn event_models_flatten_extends_chain() {
        // Raw text: property order in the file is the declared order.
        let events = ApiDeclaration::from_json(
            "events.json",
            r#"{
                "apis": [],
                "models": {
                    "Message": {"properties": {"type": {"type": "string", "required": true}}},
                    "Event": {"extends": "Message", "properties": {"application": {"type": "string"}}},
                    "ChannelDtmfReceived": {
                        "extends": "Event",
                        "properties": {
                            "digit": {"type": "string"},
                            "channel": {"type": "Channel", "required": true}
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let description = ApiDescription::from_declarations([(EVENTS_RESOURCE.to_owned(), events)]);
        let model = description.event_model("ChannelDtmfReceived").unwrap();

        let names: Vec<&str> = model.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["type", "application", "digit", "channel"]);
        assert_eq!(model.fields_of_type("Channel").collect::<Vec<_>>(), vec!["channel"]);
    }

    #[test]
    fn cyclic_extends_terminates() {
        let events = declaration(&json!({
            "models": {
                "A": {"extends": "B", "properties": {"a": {"type": "Channel"}}},
                "B": {"extends": "A", "properties": {"b": {"type": "Bridge"}}}
            }
        }));
        let description = ApiDescription::from_declarations([(EVENTS_RESOURCE.to_owned(), events)]);
        assert_eq!(description.event_model("A").unwrap().properties.len(), 2);
    }

    #[test]
    fn models_outside_events_are_not_event_models() {
        let channels = declaration(&json!({
            "models": {"Channel": {"properties": {"id": {"type": "string"}}}}
        }));
        let description = ApiDescription::from_declarations([("channels".to_owned(), channels)]);
        assert!(description.event_model("Channel").is_none());
    }
}
