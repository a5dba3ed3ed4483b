//! Router configuration for the linkdrop web front-end.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::handlers::{download_file, index, ping, show_file, upload_file, AppState};
use super::middleware::security_headers;
use crate::config::WebConfig;

/// Slack on top of the file ceiling for multipart boundaries and headers.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    let body_limit = usize::try_from(app_state.blobs.max_size())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let mut router = Router::new()
        .route("/", get(index))
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/dl/:id", get(show_file))
        .route("/dl/:id/download", get(download_file))
        .route("/ping", get(ping));

    if web_config.serve_static {
        router = router.fallback_service(ServeDir::new(&web_config.static_path));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}
