//! Document endpoint.
//!
//! Serves the current rendered document with an HTML content type,
//! appending the live-reload bootstrap script when enabled.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use md5::{Digest, Md5};

use crate::state::AppState;

/// Handle GET /.
pub(crate) async fn get_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let html = state.document.read();
    let body = match &state.reload_script {
        Some(script) => format!("{html}{script}"),
        None => html.as_str().to_owned(),
    };

    let etag = compute_etag(&state.version, &body);

    // Check If-None-Match header for conditional request
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    ([(header::ETAG, etag)], Html(body)).into_response()
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits (16 hex chars) - sufficient for cache
/// invalidation with negligible collision probability.
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
