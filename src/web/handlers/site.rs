//! Index page and liveness handlers.

use axum::{
    extract::{Query, State},
    response::Html,
};
use std::sync::Arc;

use crate::web::dto::IndexQuery;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET / - Upload form.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, ApiError> {
    let page = state.pages.index(
        query.is_success(),
        query.link.as_deref(),
        state.blobs.max_size(),
    )?;

    Ok(Html(page))
}

/// GET /ping - Liveness marker.
pub async fn ping() -> &'static str {
    "pong"
}
