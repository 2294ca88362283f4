//! GitHub Markdown API client.

use std::time::Duration;

use ureq::Agent;

use crate::{RenderError, Renderer};

/// Default rendering endpoint.
pub const GITHUB_MARKDOWN_URL: &str = "https://api.github.com/markdown";

/// Request timeout for the rendering endpoint.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Renderer backed by the GitHub Markdown API.
///
/// Sends the document as `{"text": "..."}` and uses the response body
/// verbatim as the rendered HTML.
pub struct GithubRenderer {
    agent: Agent,
    endpoint: String,
}

impl GithubRenderer {
    /// Create a renderer against the given endpoint URL.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();

        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for GithubRenderer {
    fn default() -> Self {
        Self::new(GITHUB_MARKDOWN_URL)
    }
}

impl Renderer for GithubRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let payload = serde_json::json!({ "text": markdown });

        tracing::debug!(endpoint = %self.endpoint, bytes = markdown.len(), "Sending render request");

        let response = self
            .agent
            .post(&self.endpoint)
            .header("accept", "application/vnd.github+json")
            .send_json(&payload)
            .map_err(RenderError::Http)?;

        response
            .into_body()
            .read_to_string()
            .map_err(RenderError::Body)
    }
}
