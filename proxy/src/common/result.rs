//! Common Result Type

use super::error::ProxyError;

/// Result type for every fallible proxy operation
pub type ProxyResult<T> = Result<T, ProxyError>;
