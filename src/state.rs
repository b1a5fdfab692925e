//! Application state shared across HTTP request handlers.

use std::sync::Arc;

use crate::service::alert_log::AlertSink;

/// Shared state handed to every request handler.
///
/// Cloned per request; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Destination of keep-alive records.
    pub alert_sink: Arc<dyn AlertSink>,
}

impl AppState {
    pub fn new(alert_sink: Arc<dyn AlertSink>) -> Self {
        Self { alert_sink }
    }
}
