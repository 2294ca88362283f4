//! Remote Markdown rendering for the mdlive preview server.
//!
//! This crate owns the two data-path pieces of the tool:
//!
//! - [`Renderer`]: the collaborator that converts Markdown text to HTML.
//!   The production implementation ([`GithubRenderer`]) delegates to the
//!   GitHub Markdown API; tests substitute a deterministic one.
//! - [`DocumentCache`]: the shared handle to the most recently rendered
//!   document, read concurrently by HTTP handlers while re-renders replace
//!   it.

mod cache;
mod error;
mod github;

pub use cache::DocumentCache;
pub use error::RenderError;
pub use github::{GITHUB_MARKDOWN_URL, GithubRenderer};

use std::fs;
use std::path::Path;

/// A collaborator that converts Markdown text to rendered HTML.
pub trait Renderer: Send + Sync {
    /// Render Markdown source to HTML.
    fn render(&self, markdown: &str) -> Result<String, RenderError>;

    /// Read a Markdown file and render its contents.
    fn render_file(&self, path: &Path) -> Result<String, RenderError> {
        let markdown = fs::read_to_string(path)
            .map_err(|e| RenderError::Source(path.to_path_buf(), e))?;
        self.render(&markdown)
    }
}
