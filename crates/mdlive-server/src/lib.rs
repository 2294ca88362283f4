//! HTTP server for the mdlive Markdown preview tool.
//!
//! Serves the current rendered document on `GET /` and, when live reload
//! is enabled, upgrades `GET /ws` to a WebSocket that receives the text
//! frame `"reload"` after every successful re-render.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use mdlive_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 8080,
//!         source_path: PathBuf::from("notes.md"),
//!         live_reload_enabled: true,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (mdlive-server)
//!                        │
//!                        ├─► GET /   ──► DocumentCache (shared read)
//!                        │
//!                        └─► GET /ws ──► SubscriberRegistry
//!                                              ▲
//! file change ─► notify ─► consumer task ──────┘
//!                (re-render ─► DocumentCache ─► notify_all)
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod state;

#[cfg(test)]
mod test_util;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use mdlive_render::{DocumentCache, GITHUB_MARKDOWN_URL, GithubRenderer, Renderer};
use state::AppState;
use tokio::sync::oneshot;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Markdown file to serve.
    pub source_path: PathBuf,
    /// Rendering endpoint URL.
    pub api_url: String,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Application version (part of the document `ETag`).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            source_path: PathBuf::from("README.md"),
            api_url: GITHUB_MARKDOWN_URL.to_string(),
            live_reload_enabled: false,
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the initial render fails, the source file cannot be
/// watched (at startup or after the path is replaced), or the listener
/// cannot be bound.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let renderer: Arc<dyn Renderer> = Arc::new(GithubRenderer::new(config.api_url.clone()));
    run_server_with_renderer(config, renderer).await
}

/// Run the server with a custom rendering collaborator.
pub async fn run_server_with_renderer(
    config: ServerConfig,
    renderer: Arc<dyn Renderer>,
) -> Result<(), ServerError> {
    // The first render happens before anything is served; a failure here is
    // fatal since there is no previous document to fall back to.
    let html = renderer.render_file(&config.source_path)?;
    let document = DocumentCache::new(html);
    tracing::info!(path = %config.source_path.display(), "Initial render complete");

    // Start the watcher and re-render consumer if live reload is enabled
    let (registry, watch_failure) = if config.live_reload_enabled {
        let registry = Arc::new(live_reload::SubscriberRegistry::new());
        let failure = live_reload::spawn_watcher(
            config.source_path.clone(),
            document.clone(),
            Arc::clone(&renderer),
            Arc::clone(&registry),
        )?;
        (Some(registry), Some(failure))
    } else {
        (None, None)
    };

    let reload_script = registry
        .is_some()
        .then(|| live_reload::bootstrap_script(config.port));

    let state = Arc::new(AppState {
        document,
        registry,
        reload_script,
        version: config.version.clone(),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))
        .map_err(|e| ServerError::Address(format!("{}:{}", config.host, config.port), e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(addr, e))?;
    tracing::info!(address = %addr, "Starting server");

    let serve = async {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };

    // A lost watch ends the process through the same error path as any
    // other startup failure.
    tokio::select! {
        result = serve => result.map_err(ServerError::Serve),
        err = watch_failed(watch_failure) => Err(err),
    }
}

/// Resolve with the watcher task's fatal error; pend forever otherwise.
async fn watch_failed(failure: Option<oneshot::Receiver<ServerError>>) -> ServerError {
    match failure {
        Some(rx) => match rx.await {
            Ok(err) => err,
            // Consumer ended without a report; nothing to surface.
            Err(_) => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
