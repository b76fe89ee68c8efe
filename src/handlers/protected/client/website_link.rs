use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub website_id: Uuid,
}

/// POST /api/client/website - point the caller's profile at their website
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<LinkRequest>,
) -> ApiResult<Value> {
    let website = state
        .sites
        .fetch(user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No website has been created yet"))?;
    if website.id != body.website_id {
        return Err(ApiError::forbidden("Website belongs to another user"));
    }

    state.clients.link_website(user.user_id, body.website_id).await?;
    Ok(ApiResponse::success(json!({ "cloud_kitchen_website_id": body.website_id })))
}
