//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::RealtimeService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Real-time service owning the registry, rooms and event bus.
    pub service: Arc<RealtimeService>,
    /// Bearer token required on `/api/v1`; `None` rejects every request.
    pub producer_token: Option<Arc<str>>,
}

impl AppState {
    /// Wraps a service for the router. No producer token is configured.
    #[must_use]
    pub fn new(service: RealtimeService) -> Self {
        Self {
            service: Arc::new(service),
            producer_token: None,
        }
    }

    /// Sets the bearer token producers must present.
    #[must_use]
    pub fn with_producer_token(mut self, token: Option<String>) -> Self {
        self.producer_token = token.map(Arc::from);
        self
    }
}
