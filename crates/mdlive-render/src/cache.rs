//! Shared handle to the most recently rendered document.

use std::sync::{Arc, RwLock};

/// The current rendered document, shared between HTTP handlers and the
/// re-render task.
///
/// Readers clone the inner `Arc` under a shared lock; the writer swaps it
/// under an exclusive lock, so the exclusion window is a pointer swap and a
/// reader always observes a complete document.
#[derive(Clone, Debug)]
pub struct DocumentCache {
    inner: Arc<RwLock<Arc<String>>>,
}

impl DocumentCache {
    /// Create the cache holding the initial render.
    #[must_use]
    pub fn new(html: String) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(html))),
        }
    }

    /// Get the current document.
    #[must_use]
    pub fn read(&self) -> Arc<String> {
        Arc::clone(&self.inner.read().unwrap())
    }

    /// Replace the document with a new render.
    pub fn store(&self, html: String) {
        *self.inner.write().unwrap() = Arc::new(html);
    }
}
