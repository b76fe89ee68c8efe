use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use tracing::info;

use super::owner_prefix;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub path: String,
}

/// POST /api/file/delete - remove one of the caller's stored objects
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<DeleteRequest>,
) -> ApiResult<()> {
    if !body.path.starts_with(&owner_prefix(&user.user_id)) {
        return Err(ApiError::forbidden("Object belongs to another user"));
    }

    state.storage.delete(&body.path).await?;
    info!("Deleted stored object {}", body.path);
    Ok(ApiResponse::<()>::no_content())
}
