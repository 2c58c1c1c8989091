// ── Type-scoped object dispatch ──
//
// `on_object_event` looks up which fields of an event type hold a given
// resource kind, and registers an ordinary type listener that promotes
// those fields before calling the application. One declared field gives
// the callback a single optional object; several give a field → object
// mapping with absent fields left out.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::client::{Client, WeakClient};
use crate::error::CoreError;
use crate::identifier::ObjectKey;
use crate::model::DomainObject;
use crate::multiplexer::ListenerResult;
use crate::registry::ModelKind;

/// Objects of one kind promoted out of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventObjects {
    /// The event model declares exactly one field of the kind.
    Single(Option<DomainObject>),
    /// Several declared fields, keyed by field name in declaration order.
    Many(IndexMap<String, DomainObject>),
}

impl EventObjects {
    /// The object of a single-field event.
    pub fn single(&self) -> Option<&DomainObject> {
        match self {
            Self::Single(object) => object.as_ref(),
            Self::Many(_) => None,
        }
    }

    pub fn into_single(self) -> Option<DomainObject> {
        match self {
            Self::Single(object) => object,
            Self::Many(_) => None,
        }
    }

    /// The object held in `field` of a multi-field event.
    pub fn get(&self, field: &str) -> Option<&DomainObject> {
        match self {
            Self::Single(_) => None,
            Self::Many(map) => map.get(field),
        }
    }

    /// Every promoted object, regardless of shape.
    pub fn objects(&self) -> Vec<&DomainObject> {
        match self {
            Self::Single(object) => object.iter().collect(),
            Self::Many(map) => map.values().collect(),
        }
    }

    pub fn find(&self, key: &ObjectKey) -> Option<&DomainObject> {
        self.objects().into_iter().find(|object| object.key() == key)
    }

    pub fn contains_key(&self, key: &ObjectKey) -> bool {
        self.find(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

impl Client {
    /// Listen for `event_type`, receiving the event's `kind` objects
    /// already promoted.
    ///
    /// Fails when the event type has no model, when the model has no field
    /// of `kind`, or when `kind` is not registered.
    pub fn on_object_event<F, Fut>(
        &self,
        event_type: &str,
        kind: &str,
        listener: F,
    ) -> Result<(), CoreError>
    where
        F: Fn(EventObjects, Arc<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        let model = self.description().event_model(event_type).ok_or_else(|| {
            CoreError::UnknownEventModel {
                event_type: event_type.to_owned(),
            }
        })?;
        let fields: Vec<String> = model.fields_of_type(kind).map(str::to_owned).collect();
        if fields.is_empty() {
            return Err(CoreError::NoMatchingField {
                event_type: event_type.to_owned(),
                kind: kind.to_owned(),
            });
        }
        let model_kind = self.model_kind(kind).ok_or_else(|| CoreError::UnknownModel {
            kind: kind.to_owned(),
        })?;

        debug!(event_type, kind, fields = ?fields, "registering object listener");
        let weak = self.downgrade();
        self.add_listener(
            event_type,
            Arc::new(move |event: Arc<Value>| {
                match collect_objects(&weak, &model_kind, &fields, &event) {
                    Ok(objects) => listener(objects, event).boxed(),
                    Err(e) => future::ready(Err(e)).boxed(),
                }
            }),
        );
        Ok(())
    }

    pub fn on_channel_event<F, Fut>(&self, event_type: &str, listener: F) -> Result<(), CoreError>
    where
        F: Fn(EventObjects, Arc<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.on_object_event(event_type, "Channel", listener)
    }

    pub fn on_bridge_event<F, Fut>(&self, event_type: &str, listener: F) -> Result<(), CoreError>
    where
        F: Fn(EventObjects, Arc<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.on_object_event(event_type, "Bridge", listener)
    }

    pub fn on_playback_event<F, Fut>(&self, event_type: &str, listener: F) -> Result<(), CoreError>
    where
        F: Fn(EventObjects, Arc<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.on_object_event(event_type, "Playback", listener)
    }

    pub fn on_endpoint_event<F, Fut>(&self, event_type: &str, listener: F) -> Result<(), CoreError>
    where
        F: Fn(EventObjects, Arc<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.on_object_event(event_type, "Endpoint", listener)
    }
}

/// Present means a non-empty value: `null`, `false`, `0`, `""`, `[]` and
/// `{}` all count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(f64::is_normal),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn collect_objects(
    client: &WeakClient,
    kind: &Arc<ModelKind>,
    fields: &[String],
    event: &Value,
) -> Result<EventObjects, CoreError> {
    let mut objects = IndexMap::with_capacity(fields.len());
    for field in fields {
        if let Some(value) = event.get(field).filter(|v| is_present(v)) {
            let object = DomainObject::new(client.clone(), Arc::clone(kind), value.clone())?;
            objects.insert(field.clone(), object);
        }
    }

    if fields.len() == 1 {
        Ok(EventObjects::Single(objects.into_values().next()))
    } else {
        Ok(EventObjects::Many(objects))
    }
}
