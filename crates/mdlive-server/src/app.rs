//! Router construction.
//!
//! Builds the axum router with all routes and response-header middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::handlers;
use crate::live_reload;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new().route("/", get(handlers::document::get_document));

    // WebSocket for live reload
    if state.live_reload_enabled() {
        router = router.route("/ws", get(live_reload::ws_handler));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                )),
        )
        .with_state(state)
}
