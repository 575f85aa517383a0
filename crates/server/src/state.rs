use std::sync::Arc;

use service::creations::StagedStore;

/// Shared handler state. The store is built once at startup and injected here.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<StagedStore>,
}
