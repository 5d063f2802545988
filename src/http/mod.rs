//! HTTP module
//!
//! The authenticated request pipeline.
//!
//! # Components
//!
//! - **Transport**: sends a [`RequestDescriptor`] and returns a [`ResponseEnvelope`]
//! - **ErrorClassifier**: turns a non-2xx response into a typed [`Error`](crate::Error)
//! - **AuthenticatedRequestExecutor**: bearer token, single retry on 401/403,
//!   and the GET/POST/PUT call shapes used by the service clients

mod classify;
mod executor;
mod media_type;
mod transport;
mod types;

pub use classify::{ErrorClassifier, ErrorDetail, ErrorResponse};
pub use executor::{AuthenticatedRequestExecutor, AUTHORIZATION_HEADER};
pub use media_type::{negotiate_charset, Charset, MediaType};
pub use transport::{ReqwestTransport, Transport, TransportConfig};
pub(crate) use transport::{build_client, idle_body, within_idle_timeout, Activity};
pub use types::{
    ApiRequest, BodySource, RequestBody, RequestDescriptor, ResponseBody, ResponseEnvelope,
    JSON_CONTENT_TYPE,
};
