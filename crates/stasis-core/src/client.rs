// ── Client ──
//
// Per-connection state: the API description, the HTTP operation surface,
// the type registry, and the listener tables. `Client` is a cheap handle
// (`Arc` inside); domain objects hold a `WeakClient` so listener closures
// that capture objects never keep the client alive on their own.

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde_json::Value;
use stasis_api::{ApiDescription, AriHttp, Credentials, EventStream, Params, TransportConfig};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::multiplexer::{ListenerTable, RunStats};
use crate::registry::{ModelKind, TypeRegistry};
use crate::repository::Repository;

const EVENTS_RESOURCE: &str = "events";
const EVENT_WEBSOCKET: &str = "eventWebsocket";

pub(crate) struct ClientInner {
    pub(crate) description: ApiDescription,
    pub(crate) http: AriHttp,
    pub(crate) registry: RwLock<TypeRegistry>,
    pub(crate) listeners: Mutex<ListenerTable>,
    apps: Vec<String>,
}

/// Handle to one ARI connection.
///
/// Cloning is cheap; all clones share the same registry and listeners.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

/// Non-owning back reference held by domain objects.
#[derive(Clone, Default)]
pub struct WeakClient {
    inner: Weak<ClientInner>,
}

impl WeakClient {
    /// The client, if it is still alive.
    pub fn upgrade(&self) -> Result<Client, CoreError> {
        self.inner
            .upgrade()
            .map(|inner| Client { inner })
            .ok_or(CoreError::ClientClosed)
    }
}

impl std::fmt::Debug for WeakClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.inner.strong_count() > 0 {
            "WeakClient(live)"
        } else {
            "WeakClient(closed)"
        })
    }
}

impl Client {
    // ── Construction ─────────────────────────────────────────────────

    /// Assemble a client from an already-loaded description.
    ///
    /// The registry starts with the built-in ARI kinds.
    pub fn new(
        description: ApiDescription,
        http: AriHttp,
        apps: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                description,
                http,
                registry: RwLock::new(TypeRegistry::ari()),
                listeners: Mutex::new(ListenerTable::default()),
                apps: apps.into_iter().map(Into::into).collect(),
            }),
        }
    }

    /// Build the transport, fetch the API description, and return a ready
    /// client. The event stream is not opened until [`Client::run`].
    pub async fn connect(config: &ClientConfig) -> Result<Self, CoreError> {
        use secrecy::ExposeSecret;

        let transport = TransportConfig {
            tls: (&config.tls).into(),
            timeout: config.timeout,
        };
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_owned(),
        );
        let http = AriHttp::new(&config.url, credentials, &transport)?;

        info!(url = %http.api_root(), "loading API description");
        let description = http.load_description().await?;

        Ok(Self::new(description, http, config.apps.iter().cloned()))
    }

    pub fn downgrade(&self) -> WeakClient {
        WeakClient {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn description(&self) -> &ApiDescription {
        &self.inner.description
    }

    pub fn http(&self) -> &AriHttp {
        &self.inner.http
    }

    pub fn apps(&self) -> &[String] {
        &self.inner.apps
    }

    /// Register or replace a promotable resource kind.
    ///
    /// Affects promotions performed after the call. Listeners registered
    /// earlier through `on_object_event` keep the kind they resolved.
    pub fn register_model(&self, kind: ModelKind) {
        self.inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(kind);
    }

    pub(crate) fn model_kind(&self, name: &str) -> Option<Arc<ModelKind>> {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
    }

    // ── Repositories ─────────────────────────────────────────────────

    /// Operation proxy for a described resource.
    pub fn repository(&self, name: &str) -> Result<Repository, CoreError> {
        if self.inner.description.resource(name).is_none() {
            return Err(CoreError::UnknownRepository {
                name: name.to_owned(),
            });
        }
        Ok(Repository::new(self.clone(), name))
    }

    pub fn channels(&self) -> Result<Repository, CoreError> {
        self.repository("channels")
    }

    pub fn bridges(&self) -> Result<Repository, CoreError> {
        self.repository("bridges")
    }

    pub fn endpoints(&self) -> Result<Repository, CoreError> {
        self.repository("endpoints")
    }

    pub fn playbacks(&self) -> Result<Repository, CoreError> {
        self.repository("playbacks")
    }

    pub fn sounds(&self) -> Result<Repository, CoreError> {
        self.repository("sounds")
    }

    pub fn recordings(&self) -> Result<Repository, CoreError> {
        self.repository("recordings")
    }

    pub fn device_states(&self) -> Result<Repository, CoreError> {
        self.repository("deviceStates")
    }

    // ── Event stream ─────────────────────────────────────────────────

    /// Open the event WebSocket for this client's applications and
    /// dispatch until the server closes it.
    pub async fn run(&self) -> Result<RunStats, CoreError> {
        if self.inner.apps.is_empty() {
            return Err(CoreError::Config {
                message: "no Stasis applications to subscribe to".into(),
            });
        }

        let operation = self
            .inner
            .description
            .resource(EVENTS_RESOURCE)
            .and_then(|resource| resource.operation(EVENT_WEBSOCKET))
            .ok_or_else(|| CoreError::UnknownOperation {
                resource: EVENTS_RESOURCE.into(),
                operation: EVENT_WEBSOCKET.into(),
            })?;

        let mut params = Params::new();
        params.insert(
            "app".into(),
            Value::Array(self.inner.apps.iter().cloned().map(Value::String).collect()),
        );
        let url = self.inner.http.websocket_url(operation, &params)?;
        let stream = EventStream::connect(&url, self.inner.http.tls()).await?;

        let stats = self.run_with(stream).await;
        info!(
            messages = stats.messages,
            malformed = stats.malformed,
            listener_failures = stats.listener_failures,
            "event stream closed"
        );
        Ok(stats)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_root", &self.inner.http.api_root().as_str())
            .field("apps", &self.inner.apps)
            .finish_non_exhaustive()
    }
}
