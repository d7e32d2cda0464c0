//! Application state shared across request handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::SimConfig;
use crate::placement::Placement;
use crate::store::ServerStore;

/// Shared application state.
///
/// Cloned into every handler through Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SimConfig,
    store: Mutex<ServerStore>,
    placement: Placement,
}

impl AppState {
    pub fn new(config: SimConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: Mutex::new(ServerStore::new()),
                placement: Placement::new(),
            }),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Mutex<ServerStore> {
        &self.inner.store
    }

    pub fn placement(&self) -> &Placement {
        &self.inner.placement
    }
}
