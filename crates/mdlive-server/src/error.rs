//! Error types for the HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;

use mdlive_render::RenderError;

/// Server error type.
///
/// Every variant is fatal at startup; once serving, errors are contained
/// per subscriber or per re-render and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The host/port pair is not a valid listen address.
    #[error("invalid listen address {0}")]
    Address(String, #[source] std::net::AddrParseError),

    /// The listener could not be bound.
    #[error("failed to bind {0}")]
    Bind(SocketAddr, #[source] std::io::Error),

    /// The server failed while serving.
    #[error("server error")]
    Serve(#[source] std::io::Error),

    /// The watch on the source file could not be established.
    #[error("failed to watch {0}")]
    Watch(PathBuf, #[source] notify::Error),

    /// Render error (fatal only for the initial render).
    #[error(transparent)]
    Render(#[from] RenderError),
}
