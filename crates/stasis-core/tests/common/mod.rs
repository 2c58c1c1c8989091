#![allow(clippy::unwrap_used, dead_code)]
// Shared fixtures: a trimmed ARI description and client builders.

use serde_json::{Value, json};
use stasis_api::{ApiDeclaration, ApiDescription, AriHttp, Credentials, TransportConfig};
use stasis_core::Client;
use url::Url;

fn declaration(value: &Value) -> (String, ApiDeclaration) {
    declaration_text(&value.to_string())
}

fn declaration_text(text: &str) -> (String, ApiDeclaration) {
    let declaration = ApiDeclaration::from_json("fixture", text).unwrap();
    (declaration.resource_name().unwrap(), declaration)
}

fn path_param(name: &str) -> Value {
    json!({"name": name, "paramType": "path", "required": true})
}

pub fn channels_declaration() -> Value {
    json!({
        "resourcePath": "/api-docs/channels.{format}",
        "apis": [
            {
                "path": "/channels",
                "operations": [{"httpMethod": "GET", "nickname": "list", "responseClass": "List[Channel]"}]
            },
            {
                "path": "/channels/{channelId}",
                "operations": [
                    {"httpMethod": "GET", "nickname": "get", "responseClass": "Channel",
                     "parameters": [path_param("channelId")]},
                    {"httpMethod": "DELETE", "nickname": "hangup", "responseClass": "void",
                     "parameters": [path_param("channelId"),
                                    {"name": "reason", "paramType": "query"}]}
                ]
            },
            {
                "path": "/channels/{channelId}/answer",
                "operations": [{"httpMethod": "POST", "nickname": "answer", "responseClass": "void",
                                "parameters": [path_param("channelId")]}]
            },
            {
                "path": "/channels/{channelId}/play",
                "operations": [{"httpMethod": "POST", "nickname": "play", "responseClass": "Playback",
                                "parameters": [path_param("channelId"),
                                               {"name": "media", "paramType": "query", "required": true,
                                                "allowMultiple": true}]}]
            },
            {
                "path": "/channels/{channelId}/variable",
                "operations": [{"httpMethod": "GET", "nickname": "getChannelVar", "responseClass": "Variable",
                                "parameters": [path_param("channelId"),
                                               {"name": "variable", "paramType": "query", "required": true}]}]
            }
        ]
    })
}

pub fn endpoints_declaration() -> Value {
    json!({
        "resourcePath": "/api-docs/endpoints.{format}",
        "apis": [
            {
                "path": "/endpoints",
                "operations": [{"httpMethod": "GET", "nickname": "list", "responseClass": "List[Endpoint]"}]
            },
            {
                "path": "/endpoints/{tech}/{resource}",
                "operations": [{"httpMethod": "GET", "nickname": "get", "responseClass": "Endpoint",
                                "parameters": [path_param("tech"), path_param("resource")]}]
            }
        ]
    })
}

pub fn asterisk_declaration() -> Value {
    json!({
        "resourcePath": "/api-docs/asterisk.{format}",
        "apis": [{
            "path": "/asterisk/info",
            "operations": [{"httpMethod": "GET", "nickname": "getInfo", "responseClass": "AsteriskInfo"}]
        }]
    })
}

/// Kept as raw text: model properties must reach the parser in file
/// order, which a `json!` value (sorted keys) would not preserve.
pub const EVENTS_DECLARATION: &str = r#"{
    "resourcePath": "/api-docs/events.{format}",
    "apis": [{
        "path": "/events",
        "operations": [{"httpMethod": "GET", "nickname": "eventWebsocket", "upgrade": "websocket",
                        "responseClass": "Message",
                        "parameters": [{"name": "app", "paramType": "query", "required": true,
                                        "allowMultiple": true}]}]
    }],
    "models": {
        "Event": {"properties": {"application": {"type": "string", "required": true},
                                 "timestamp": {"type": "Date"}}},
        "StasisStart": {"extends": "Event", "properties": {
            "args": {"type": "List[string]", "required": true},
            "channel": {"type": "Channel", "required": true},
            "replace_channel": {"type": "Channel"}
        }},
        "ChannelDtmfReceived": {"extends": "Event", "properties": {
            "digit": {"type": "string", "required": true},
            "duration_ms": {"type": "int", "required": true},
            "channel": {"type": "Channel", "required": true}
        }},
        "ChannelVarset": {"extends": "Event", "properties": {
            "variable": {"type": "string", "required": true},
            "value": {"type": "string", "required": true},
            "channel": {"type": "Channel"}
        }},
        "Dial": {"extends": "Event", "properties": {
            "caller": {"type": "Channel"},
            "peer": {"type": "Channel", "required": true},
            "forward": {"type": "string"},
            "forwarded": {"type": "Channel"},
            "dialstring": {"type": "string"},
            "dialstatus": {"type": "string", "required": true}
        }},
        "BridgeMerged": {"extends": "Event", "properties": {
            "bridge": {"type": "Bridge", "required": true},
            "bridge_from": {"type": "Bridge", "required": true}
        }}
    }
}"#;

pub fn description() -> ApiDescription {
    ApiDescription::from_declarations([
        declaration(&channels_declaration()),
        declaration(&endpoints_declaration()),
        declaration(&asterisk_declaration()),
        declaration_text(EVENTS_DECLARATION),
    ])
}

/// Client pointed at `base` (a wiremock server, or an unused address for
/// event-only tests).
pub fn client(base: &str) -> Client {
    let http = AriHttp::new(
        &Url::parse(base).unwrap(),
        Credentials::new("asterisk", "secret"),
        &TransportConfig::default(),
    )
    .unwrap();
    Client::new(description(), http, ["hello"])
}

pub fn offline_client() -> Client {
    client("http://127.0.0.1:9")
}
