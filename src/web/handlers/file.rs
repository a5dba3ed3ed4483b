//! Upload, landing page and download handlers.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap},
    response::{Html, Response},
    Json,
};
use std::sync::Arc;

use crate::blob::StoredBlob;
use crate::web::dto::UploadResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped and `"`/`\` replaced in the plain
/// `filename` parameter; non-ASCII names also get an RFC 5987 `filename*`.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = sanitized
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

/// Strip any client-side directory part from an uploaded filename.
fn base_name(filename: &str) -> &str {
    filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename)
        .trim()
}

/// POST /upload - Store a file and return its share link.
///
/// Request body: multipart/form-data with a `file` field.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("invalid_multipart")
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = match field.file_name().map(base_name) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ApiError::bad_request("no_file")),
        };

        // Parts after the first `file` field are never read, so nothing
        // between storing the blob and creating its record can fail on input.
        let blob = state.blobs.store(field, &original_name).await?;
        let id = publish(&state, &original_name, &blob).await?;

        return Ok(Json(UploadResponse::new(state.links.share_link(&headers, &id))));
    }

    Err(ApiError::bad_request("no_file"))
}

/// Create the record for a stored blob, deleting the blob if that fails.
async fn publish(
    state: &AppState,
    original_name: &str,
    blob: &StoredBlob,
) -> Result<String, ApiError> {
    let id = match state
        .records
        .create_record(original_name, &blob.storage_path, blob.size_bytes)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            // The blob would be unreachable without a record.
            if let Err(cleanup) = state.blobs.delete(&blob.storage_path).await {
                tracing::warn!(
                    storage_path = %blob.storage_path,
                    error = %cleanup,
                    "Failed to remove orphaned blob"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        id = %id,
        name = %original_name,
        size = blob.size_bytes,
        "File uploaded"
    );

    Ok(id)
}

/// GET /dl/:id - Landing page; counts one view.
pub async fn show_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let record = state.records.increment_view(&id).await?;

    let download_url = format!("/dl/{}/download", record.id);
    let page = state.pages.landing(&record, &download_url)?;

    Ok(Html(page))
}

/// GET /dl/:id/download - Stream the file; counts one download.
///
/// The blob is opened before the counter moves, so a missing blob is a 404
/// that does not count as a download.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let record = state.records.get_record(&id).await?;
    let reader = state.blobs.retrieve(&record.storage_path).await?;
    let record = state.records.increment_download(&id).await?;

    let content_type = mime_guess::from_path(&record.original_name)
        .first_or_octet_stream()
        .to_string();

    tracing::info!(id = %record.id, downloads = record.download_count, "File downloaded");

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.original_name),
        )
        .header(header::CONTENT_LENGTH, reader.len())
        .body(Body::from_stream(reader.into_stream()))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal()
        })
}
