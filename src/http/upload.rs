//! Avatar Upload Handler

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::{error, info, warn};

use super::server::AppState;
use crate::chat::epoch_millis;

/// `POST /upload` — store an avatar image from the `avatar-file` multipart
/// field.
///
/// The file lands in the uploads directory as `user-<epoch-millis><ext>`,
/// a name that cannot collide with bundled assets, and the response carries
/// only the public path. Whether any presence record ever references the
/// URL is not this endpoint's concern.
pub async fn upload_avatar(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read multipart body");
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart body: {}", e),
                )
                    .into_response();
            }
        };

        if field.name() != Some("avatar-file") {
            continue;
        }

        let extension = field.file_name().map(file_extension).unwrap_or_default();

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "failed to read uploaded file");
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart body: {}", e),
                )
                    .into_response();
            }
        };

        if data.len() > state.config.http.max_upload_bytes {
            warn!(bytes = data.len(), "rejecting oversized upload");
            return (StatusCode::PAYLOAD_TOO_LARGE, "File too large.").into_response();
        }

        let filename = format!("user-{}{}", epoch_millis(), extension);
        let destination = state.config.http.uploads_dir.join(&filename);

        if let Err(e) = tokio::fs::write(&destination, &data).await {
            error!(error = %e, path = %destination.display(), "failed to store uploaded file");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store file.").into_response();
        }

        info!(file = %filename, bytes = data.len(), "stored uploaded avatar");

        return Json(serde_json::json!({
            "success": true,
            "url": format!("/{}", filename),
        }))
        .into_response();
    }

    (StatusCode::BAD_REQUEST, "No file sent.").into_response()
}

/// Extension of the original filename, dot included, or empty when absent.
fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
