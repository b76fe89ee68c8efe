use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::forms::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{ImageSlot, SiteDocument, WebsiteRecord};
use crate::server::AppState;

/// Persisted image fields must hold durable absolute URLs
fn check_images(document: &SiteDocument, errors: &mut FieldErrors) {
    for slot in ImageSlot::ALL {
        let value = document.image(slot).trim();
        if value.is_empty() {
            errors.add(slot.key(), "Image is required");
        } else if url::Url::parse(value).is_err() {
            errors.add(slot.key(), "Image must be an absolute URL");
        }
    }
}

/// POST /api/website - create the caller's storefront (once)
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(record): Json<WebsiteRecord>,
) -> ApiResult<WebsiteRecord> {
    user.ensure_owner(record.user_id)?;
    let mut errors = FieldErrors::new();
    errors.require("website_name", &record.website_name, "Website name is required");
    check_images(&record.website_data, &mut errors);
    errors.finish(|| ())?;

    let stored = state.sites.insert(&record).await?;
    Ok(ApiResponse::created(stored))
}

/// GET /api/website/:user_id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<WebsiteRecord> {
    user.ensure_owner(user_id)?;

    match state.sites.fetch(user_id).await? {
        Some(record) => Ok(ApiResponse::success(record)),
        None => Err(ApiError::not_found(format!("No website for {}", user_id))),
    }
}

/// PUT /api/website - overwrite the caller's document, last write wins
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(document): Json<SiteDocument>,
) -> ApiResult<WebsiteRecord> {
    let mut errors = FieldErrors::new();
    check_images(&document, &mut errors);
    errors.finish(|| ())?;

    let stored = state.sites.replace_document(user.user_id, &document).await?;
    Ok(ApiResponse::success(stored))
}
