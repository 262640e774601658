//! Common Utilities
//!
//! Shared error types and HTTP helpers used by every downstream client.

pub mod error;
pub mod http;
pub mod result;

pub use error::ProxyError;
pub use http::{create_http_client, read_body};
pub use result::ProxyResult;
