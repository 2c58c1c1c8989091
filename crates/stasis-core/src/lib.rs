// stasis-core: Event multiplexing and object promotion for ARI clients.
//
// This crate sits between `stasis-api` (raw HTTP + WebSocket) and
// applications. It owns:
//
// - **Identity** (`identifier`, `registry`): how each resource kind finds
//   its key and the parameters that address it.
// - **Promotion** (`promote`): operation results become `DomainObject`s.
// - **Operation proxy** (`repository`, `model`): named operations on
//   collections and on single instances.
// - **Event multiplexing** (`multiplexer`, `dispatch`): one pull loop,
//   listeners by event type, by resource kind, and by instance.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identifier;
pub mod model;
pub mod multiplexer;
pub mod promote;
pub mod registry;
pub mod repository;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{Client, WeakClient};
pub use config::{ClientConfig, TlsVerification};
pub use dispatch::EventObjects;
pub use error::CoreError;
pub use identifier::{CompositeIdentifier, FieldIdentifier, ObjectIdentifier, ObjectKey};
pub use model::DomainObject;
pub use multiplexer::{Dispatch, EventListener, ListenerResult, RunStats};
pub use promote::{Promoted, parse_descriptor};
pub use registry::{ModelKind, TypeRegistry};
pub use repository::Repository;

// Transport types applications commonly need alongside the core.
pub use stasis_api::{ApiDescription, AriHttp, MessageSource, Params};
