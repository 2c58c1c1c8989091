// ── Model kinds and the type registry ──
//
// The registry maps a type name from the API description (`Channel`,
// `Bridge`, ...) to the resource that serves its operations and the
// identity strategy for its snapshots. Promotion consults it to decide
// whether a JSON value becomes a live `DomainObject`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::identifier::{CompositeIdentifier, FieldIdentifier, ObjectIdentifier};

/// One promotable resource kind.
pub struct ModelKind {
    name: String,
    repository: String,
    identifier: Arc<dyn ObjectIdentifier>,
}

impl ModelKind {
    /// `name` is the model type name, `repository` the resource whose
    /// operations act on instances of it.
    pub fn new(
        name: impl Into<String>,
        repository: impl Into<String>,
        identifier: impl ObjectIdentifier + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            repository: repository.into(),
            identifier: Arc::new(identifier),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn identifier(&self) -> &dyn ObjectIdentifier {
        self.identifier.as_ref()
    }
}

impl fmt::Debug for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelKind")
            .field("name", &self.name)
            .field("repository", &self.repository)
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// Type name → model kind.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    kinds: HashMap<String, Arc<ModelKind>>,
}

impl TypeRegistry {
    /// An empty registry: every type passes through as raw JSON.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The ARI resource kinds this client models out of the box.
    pub fn ari() -> Self {
        let mut registry = Self::empty();
        registry.register(ModelKind::new("Channel", "channels", FieldIdentifier::id("channelId")));
        registry.register(ModelKind::new("Bridge", "bridges", FieldIdentifier::id("bridgeId")));
        registry.register(ModelKind::new(
            "Playback",
            "playbacks",
            FieldIdentifier::id("playbackId"),
        ));
        registry.register(ModelKind::new("Sound", "sounds", FieldIdentifier::id("soundId")));
        registry.register(ModelKind::new("Endpoint", "endpoints", CompositeIdentifier::endpoint()));
        registry.register(ModelKind::new(
            "LiveRecording",
            "recordings",
            FieldIdentifier::new("name", "recordingName"),
        ));
        registry.register(ModelKind::new(
            "StoredRecording",
            "recordings",
            FieldIdentifier::new("name", "recordingName"),
        ));
        registry.register(ModelKind::new(
            "DeviceState",
            "deviceStates",
            FieldIdentifier::new("name", "deviceName"),
        ));
        registry
    }

    /// Add or replace a kind. Returns the kind previously registered under
    /// the same name.
    pub fn register(&mut self, kind: ModelKind) -> Option<Arc<ModelKind>> {
        self.kinds.insert(kind.name.clone(), Arc::new(kind))
    }

    pub fn get(&self, name: &str) -> Option<Arc<ModelKind>> {
        self.kinds.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}
