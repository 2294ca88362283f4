//! Render error types.

use std::path::PathBuf;

/// Error during remote rendering.
///
/// Rendering is never retried here; callers decide whether a failure is
/// fatal (initial render) or recoverable (watch-triggered re-render).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The Markdown source file could not be read.
    #[error("failed to read {0}")]
    Source(PathBuf, #[source] std::io::Error),

    /// The request to the rendering endpoint failed.
    #[error("render request failed: {0}")]
    Http(#[source] ureq::Error),

    /// The response body could not be read to completion.
    #[error("failed to read render response: {0}")]
    Body(#[source] ureq::Error),
}
