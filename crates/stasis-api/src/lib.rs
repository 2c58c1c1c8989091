// stasis-api: Async transport for the Asterisk REST Interface (ARI)

pub mod auth;
pub mod description;
pub mod error;
pub mod http;
pub mod transport;
pub mod websocket;

pub use auth::Credentials;
pub use description::{
    ApiDeclaration, ApiDescription, EventModel, Operation, ParamType, Parameter, PropertyModel,
    ResourceApi,
};
pub use error::Error;
pub use http::{AriHttp, Params, RawResponse};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{EventStream, MessageSource};
