//! Shared test helpers.

use std::sync::Arc;

use mdlive_render::{DocumentCache, RenderError, Renderer};

use crate::live_reload::{SubscriberRegistry, bootstrap_script};
use crate::state::AppState;

/// Renderer returning a fixed document, or failing on demand.
pub(crate) struct FakeRenderer {
    html: String,
    fail: bool,
}

impl FakeRenderer {
    pub(crate) fn ok(html: &str) -> Self {
        Self {
            html: html.to_owned(),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            html: String::new(),
            fail: true,
        }
    }
}

impl Renderer for FakeRenderer {
    fn render(&self, _markdown: &str) -> Result<String, RenderError> {
        if self.fail {
            Err(RenderError::Source(
                "simulated".into(),
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "simulated failure"),
            ))
        } else {
            Ok(self.html.clone())
        }
    }
}

/// Application state around a fixed document.
pub(crate) fn state(html: &str, with_live_reload: bool) -> Arc<AppState> {
    let registry = with_live_reload.then(|| Arc::new(SubscriberRegistry::new()));
    let reload_script = registry.is_some().then(|| bootstrap_script(8080));

    Arc::new(AppState {
        document: DocumentCache::new(html.to_owned()),
        registry,
        reload_script,
        version: "test".to_owned(),
    })
}
