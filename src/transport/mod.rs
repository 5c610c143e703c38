//! HTTP transport to model providers.

mod http;

pub use http::{resolve_api_key, AuthStyle, HttpTransport, TransportError};
pub(crate) use http::{build_client, remote_error};
