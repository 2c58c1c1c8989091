// ── Domain objects ──
//
// One record type for every resource kind: a weak client reference, the
// kind (repository + identity strategy), the last JSON snapshot, and the
// key computed once at construction. Kind-specific behaviour lives in the
// API description, not in per-kind Rust types.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future;
use serde_json::Value;
use stasis_api::Params;

use crate::client::WeakClient;
use crate::dispatch::EventObjects;
use crate::error::CoreError;
use crate::identifier::ObjectKey;
use crate::multiplexer::ListenerResult;
use crate::promote::Promoted;
use crate::registry::ModelKind;
use crate::repository::args_to_params;

/// A live handle to one resource instance.
#[derive(Clone)]
pub struct DomainObject {
    client: WeakClient,
    kind: Arc<ModelKind>,
    snapshot: Arc<Value>,
    key: ObjectKey,
}

impl DomainObject {
    /// Wrap a snapshot. Fails if the kind's identity fields are missing.
    pub fn new(client: WeakClient, kind: Arc<ModelKind>, json: Value) -> Result<Self, CoreError> {
        let key = kind.identifier().key(kind.name(), &json)?;
        Ok(Self {
            client,
            kind,
            snapshot: Arc::new(json),
            key,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Model type name, e.g. `Channel`.
    pub fn kind(&self) -> &str {
        self.kind.name()
    }

    /// Resource that serves this object's operations, e.g. `channels`.
    pub fn repository(&self) -> &str {
        self.kind.repository()
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Last-known snapshot, verbatim.
    pub fn json(&self) -> &Value {
        &self.snapshot
    }

    /// Shorthand for `json().get(field)`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.snapshot.get(field)
    }

    /// Parameters that address this instance in operation calls.
    pub fn operation_params(&self) -> Result<Params, CoreError> {
        self.kind
            .identifier()
            .operation_params(self.kind.name(), &self.snapshot)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Invoke `operation` on this instance.
    ///
    /// Identity parameters are merged in for every parameter the operation
    /// declares; explicit `args` win on conflict.
    pub async fn invoke(&self, operation: &str, args: Value) -> Result<Promoted, CoreError> {
        let client = self.client.upgrade()?;
        let op = client.operation(self.repository(), operation)?;

        let mut params: Params = self
            .operation_params()?
            .into_iter()
            .filter(|(name, _)| op.declares(name))
            .collect();
        params.extend(args_to_params(args)?);

        client.invoke_operation(op, params).await
    }

    /// Re-fetch through the repository's `get` operation and replace the
    /// snapshot wholesale.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        match self.invoke("get", Value::Null).await? {
            Promoted::Object(fresh) => {
                self.snapshot = fresh.snapshot;
                Ok(())
            }
            other => Err(CoreError::UnexpectedResponse {
                operation: format!("{}.get", self.repository()),
                message: format!("expected a single {}, got {other:?}", self.kind()),
            }),
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Listen for `event_type` events that reference this instance.
    ///
    /// Builds on [`Client::on_object_event`](crate::Client::on_object_event)
    /// for this object's kind; the callback only runs when this key is
    /// among the promoted objects.
    pub fn on_event<F, Fut>(&self, event_type: &str, listener: F) -> Result<(), CoreError>
    where
        F: Fn(EventObjects, Arc<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        let client = self.client.upgrade()?;
        let key = self.key.clone();
        client.on_object_event(event_type, self.kind(), move |objects, event| {
            if objects.contains_key(&key) {
                listener(objects, event).boxed()
            } else {
                future::ready(Ok(())).boxed()
            }
        })
    }
}

impl PartialEq for DomainObject {
    fn eq(&self, other: &Self) -> bool {
        self.kind.name() == other.kind.name() && self.key == other.key
    }
}

impl Eq for DomainObject {}

impl fmt::Debug for DomainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainObject")
            .field("kind", &self.kind.name())
            .field("key", &self.key)
            .field("json", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DomainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.name(), self.key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::TypeRegistry;

    fn channel(json: Value) -> Result<DomainObject, CoreError> {
        let kind = TypeRegistry::ari().get("Channel").unwrap();
        DomainObject::new(WeakClient::default(), kind, json)
    }

    #[test]
    fn key_is_computed_once_from_snapshot() {
        let object = channel(json!({"id": "c1", "state": "Ring"})).unwrap();
        assert_eq!(object.key(), &ObjectKey::from("c1"));
        assert_eq!(object.kind(), "Channel");
        assert_eq!(object.repository(), "channels");
        assert_eq!(object.get("state"), Some(&json!("Ring")));
        assert_eq!(object.to_string(), "Channel(c1)");
    }

    #[test]
    fn snapshots_of_same_resource_compare_equal() {
        let ringing = channel(json!({"id": "c1", "state": "Ring"})).unwrap();
        let up = channel(json!({"id": "c1", "state": "Up"})).unwrap();
        let other = channel(json!({"id": "c2", "state": "Up"})).unwrap();
        assert_eq!(ringing, up);
        assert_ne!(up, other);
    }

    #[test]
    fn missing_identity_is_malformed() {
        let err = channel(json!({"state": "Up"})).unwrap_err();
        assert!(matches!(err, CoreError::MalformedResource { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn operations_need_a_live_client() {
        let object = channel(json!({"id": "c1"})).unwrap();
        let err = object.invoke("answer", Value::Null).await.unwrap_err();
        assert!(matches!(err, CoreError::ClientClosed), "got {err:?}");
        assert!(matches!(
            object.on_event("ChannelDtmfReceived", |_, _| async { Ok(()) }),
            Err(CoreError::ClientClosed)
        ));
    }
}
