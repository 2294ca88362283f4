//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use mdlive_render::DocumentCache;

use crate::live_reload::SubscriberRegistry;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Current rendered document.
    pub(crate) document: DocumentCache,
    /// Subscriber registry (if live reload is enabled).
    pub(crate) registry: Option<Arc<SubscriberRegistry>>,
    /// Bootstrap script appended to document responses (if live reload is
    /// enabled).
    pub(crate) reload_script: Option<String>,
    /// Application version, part of the document `ETag`.
    pub(crate) version: String,
}

impl AppState {
    /// Check if live reload is enabled.
    pub(crate) fn live_reload_enabled(&self) -> bool {
        self.registry.is_some()
    }
}
