#![allow(clippy::unwrap_used)]
// Operation proxy and response promotion against a wiremock ARI server.

mod common;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stasis_core::{Client, CoreError, FieldIdentifier, ModelKind, ObjectKey, Promoted};

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let client = common::client(&server.uri());
    (server, client)
}

// ── Promotion ───────────────────────────────────────────────────────

#[tokio::test]
async fn list_promotes_each_element_with_stable_keys() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ari/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "c1", "name": "PJSIP/alice-00000001", "state": "Ring"},
            {"id": "c2", "name": "PJSIP/bob-00000002", "state": "Up"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ari/channels/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            {"id": "c1", "name": "PJSIP/alice-00000001", "state": "Up"}
        )))
        .mount(&server)
        .await;

    let channels = client.channels().unwrap().list().await.unwrap().into_list();
    let keys: Vec<&str> = channels.iter().map(|c| c.key().as_str()).collect();
    assert_eq!(keys, vec!["c1", "c2"]);

    let fetched = channels[0].invoke("get", Value::Null).await.unwrap().into_object().unwrap();
    assert_eq!(fetched.key(), channels[0].key());
    assert_eq!(fetched, channels[0]);
    assert_eq!(fetched.get("state"), Some(&json!("Up")));
}

#[tokio::test]
async fn no_content_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/ari/channels/c1/answer"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let channel = client.promote("Channel", json!({"id": "c1"})).unwrap().into_object().unwrap();
    let result = channel.invoke("answer", Value::Null).await.unwrap();
    assert_eq!(result, Promoted::Empty);
}

#[tokio::test]
async fn no_content_for_registered_type_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ari/channels/c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let channel = client.promote("Channel", json!({"id": "c1"})).unwrap().into_object().unwrap();
    let result = channel.invoke("get", Value::Null).await.unwrap();
    assert_eq!(result, Promoted::Empty);
}

#[tokio::test]
async fn unregistered_type_passes_json_through() {
    let (server, client) = setup().await;
    let info = json!({"system": {"version": "20.5.0"}, "config": {"name": "pbx"}});

    Mock::given(method("GET"))
        .and(path("/ari/asterisk/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(info.clone()))
        .mount(&server)
        .await;

    let result = client.repository("asterisk").unwrap().invoke("getInfo", Value::Null).await.unwrap();
    assert_eq!(result, Promoted::Json(info));
}

#[tokio::test]
async fn registering_a_kind_promotes_later_responses() {
    let (server, client) = setup().await;
    let system = json!({"version": "20.5.0"});

    Mock::given(method("GET"))
        .and(path("/ari/asterisk/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entity_id": "aa:bb", "system": system})))
        .mount(&server)
        .await;

    client.register_model(ModelKind::new(
        "AsteriskInfo",
        "asterisk",
        FieldIdentifier::new("entity_id", "entityId"),
    ));
    let info = client
        .repository("asterisk")
        .unwrap()
        .invoke("getInfo", Value::Null)
        .await
        .unwrap()
        .into_object()
        .unwrap();
    assert_eq!(info.kind(), "AsteriskInfo");
    assert_eq!(info.key(), &ObjectKey::from("aa:bb"));
    assert_eq!(info.get("system"), Some(&system));
}

#[tokio::test]
async fn registered_type_with_bad_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ari/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client.channels().unwrap().list().await.unwrap_err();
    assert!(matches!(err, CoreError::Deserialization { .. }), "got {err:?}");
}

// ── Operation proxy ─────────────────────────────────────────────────

#[tokio::test]
async fn instance_operations_carry_identity_params() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/ari/channels/c1/play"))
        .and(query_param("media", "sound:hello-world"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "pb-1", "media_uri": "sound:hello-world", "state": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let channel = client.promote("Channel", json!({"id": "c1"})).unwrap().into_object().unwrap();
    let playback = channel
        .invoke("play", json!({"media": "sound:hello-world"}))
        .await
        .unwrap()
        .into_object()
        .unwrap();

    assert_eq!(playback.kind(), "Playback");
    assert_eq!(playback.key(), &ObjectKey::from("pb-1"));
}

#[tokio::test]
async fn explicit_arguments_override_identity() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/ari/channels/c2"))
        .and(query_param("reason", "busy"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let channel = client.promote("Channel", json!({"id": "c1"})).unwrap().into_object().unwrap();
    let result = channel
        .invoke("hangup", json!({"channelId": "c2", "reason": "busy"}))
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn composite_identity_addresses_endpoints() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ari/endpoints/PJSIP/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "technology": "PJSIP", "resource": "alice", "state": "online", "channel_ids": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut endpoint = client
        .promote("Endpoint", json!({"technology": "PJSIP", "resource": "alice", "state": "offline"}))
        .unwrap()
        .into_object()
        .unwrap();
    assert_eq!(endpoint.key(), &ObjectKey::from("PJSIP/alice"));

    endpoint.refresh().await.unwrap();
    assert_eq!(endpoint.get("state"), Some(&json!("online")));
}

#[tokio::test]
async fn unknown_operation_is_distinct_from_failed_operation() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ari/channels/c1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let channel = client.promote("Channel", json!({"id": "c1"})).unwrap().into_object().unwrap();

    let err = channel.invoke("teleport", Value::Null).await.unwrap_err();
    assert!(
        matches!(err, CoreError::UnknownOperation { ref resource, ref operation }
            if resource == "channels" && operation == "teleport"),
        "got {err:?}"
    );

    let err = channel.invoke("get", Value::Null).await.unwrap_err();
    match err {
        CoreError::OperationFailed { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("expected OperationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn not_found_is_reported_with_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/ari/channels/gone/answer"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Channel not found"})))
        .mount(&server)
        .await;

    let channel = client.promote("Channel", json!({"id": "gone"})).unwrap().into_object().unwrap();
    let err = channel.invoke("answer", Value::Null).await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn unknown_repository_and_bad_arguments() {
    let client = common::offline_client();

    let err = client.repository("mailboxes").unwrap_err();
    assert!(matches!(err, CoreError::UnknownRepository { .. }), "got {err:?}");

    let err = client
        .channels()
        .unwrap()
        .invoke("list", json!("not an object"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidArguments { .. }), "got {err:?}");

    let err = client
        .channels()
        .unwrap()
        .invoke("list", json!({"bogus": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Parameters { .. }), "got {err:?}");
}

#[tokio::test]
async fn repository_lists_declared_operations() {
    let client = common::offline_client();
    let channels = client.channels().unwrap();
    let names = channels.operation_names();
    assert_eq!(names, vec!["answer", "get", "getChannelVar", "hangup", "list", "play"]);
}
