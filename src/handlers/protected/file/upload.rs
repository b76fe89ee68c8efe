use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Extension,
};
use serde::Deserialize;
use tracing::info;

use super::owner_prefix;
use crate::assets::{mime_for_name, DISH_FOLDER, LOGO_FOLDER, SITE_FOLDER};
use crate::error::ApiError;
use crate::gateway::StoredObject;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

const FOLDERS: [&str; 3] = [DISH_FOLDER, LOGO_FOLDER, SITE_FOLDER];

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}

/// POST /api/upload/:folder?filename= - store the raw request body
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(folder): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StoredObject> {
    if !FOLDERS.contains(&folder.as_str()) {
        return Err(ApiError::bad_request(format!("Unknown upload folder '{}'", folder)));
    }
    if !is_plain_file_name(&query.filename) {
        return Err(ApiError::bad_request("filename must be a plain file name"));
    }
    if body.is_empty() {
        return Err(ApiError::bad_request("Upload body is empty"));
    }
    if body.len() > state.max_upload_bytes {
        return Err(ApiError::payload_too_large(format!(
            "Upload exceeds {} bytes",
            state.max_upload_bytes
        )));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| mime_for_name(&query.filename))
        .to_string();

    let path = format!("{}{}/{}", owner_prefix(&user.user_id), folder, query.filename);
    let stored = state.storage.upload(body.to_vec(), &path, &content_type).await?;

    info!("Stored {} ({} bytes) for {}", stored.path, body.len(), user.user_id);
    Ok(ApiResponse::created(stored))
}
