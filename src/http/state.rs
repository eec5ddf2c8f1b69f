use crate::relay::RelayClient;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayClient>,
}

impl AppState {
    pub fn new(relay: RelayClient) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}
