//! services/api/src/web/files.rs
//!
//! File upload. Text files are decoded and kept for use as evaluation context;
//! Binaries and oversized PDFs are stored by name only.

use crate::web::{protocol::UploadResponse, state::AppState};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use feynman_core::attachment;
use std::sync::Arc;
use tracing::{error, info};

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Upload a file to use as context for later evaluations and questions.
///
/// Accepts a multipart/form-data request with a part named `file`.
#[utoipa::path(
    post,
    path = "/files",
    request_body(content_type = "multipart/form-data", description = "The file to upload."),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file part in the request"),
        (status = 413, description = "Upload exceeds the size limit")
    )
)]
pub async fn upload_file_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut upload: Option<(String, Option<String>, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            e.status(),
            format!("Failed to read multipart data: {}", e.body_text()),
        )
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("untitled.txt").to_string();
        let mime = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| {
            (
                e.status(),
                format!("Failed to read file bytes: {}", e.body_text()),
            )
        })?;
        upload = Some((name, mime, data));
        break;
    }

    let Some((name, mime, data)) = upload else {
        return Err((StatusCode::BAD_REQUEST, "Missing file".to_string()));
    };

    let context = attachment::extract(
        &name,
        mime.as_deref(),
        &data,
        app_state.config.max_inline_bytes,
    );
    let inlined = !context.content.is_empty();

    match app_state.files.save(context, data.len()).await {
        Ok(stored) => {
            info!(
                "Stored upload {} ({} bytes, text inlined: {})",
                stored.context.name, stored.size, inlined
            );
            let response = UploadResponse {
                file_id: stored.id,
                filename: stored.context.name,
                content: Some(stored.context.content).filter(|c| !c.is_empty()),
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            error!("Failed to store upload: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store upload".to_string(),
            ))
        }
    }
}
