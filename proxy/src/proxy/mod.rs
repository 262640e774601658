//! HTTP Surface
//!
//! Exposes the dispatcher under `/questionnaire`:
//! health, documentation, `submit` and `push`.

mod docs;
pub mod handlers;
pub mod server;

use std::sync::Arc;

use crate::router::Dispatcher;

pub use server::ProxyServer;

/// Route prefix for every endpoint
pub const BASE_PATH: &str = "/questionnaire";

/// State shared by all request handlers
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Arc<Self> {
        Arc::new(Self { dispatcher })
    }
}
