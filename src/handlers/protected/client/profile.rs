use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::forms::account::{validate_profile, ProfileValues};
use crate::forms::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::ClientProfile;
use crate::server::AppState;

/// Re-checks the profile rules server-side; gender and marital status may be absent
fn check_profile(profile: &ClientProfile) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    validate_profile(&ProfileValues::from(profile), false, &mut errors);
    if !errors.is_empty() {
        return Err(errors.into());
    }
    Ok(())
}

/// POST /api/client - create the caller's profile
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(profile): Json<ClientProfile>,
) -> ApiResult<ClientProfile> {
    user.ensure_owner(profile.user_id)?;
    check_profile(&profile)?;

    let stored = state.clients.insert(&profile).await?;
    Ok(ApiResponse::created(stored))
}

/// PUT /api/client - replace the caller's profile fields
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(profile): Json<ClientProfile>,
) -> ApiResult<ClientProfile> {
    user.ensure_owner(profile.user_id)?;
    check_profile(&profile)?;

    let stored = state.clients.update(&profile).await?;
    Ok(ApiResponse::success(stored))
}

/// GET /api/client/:user_id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<ClientProfile> {
    user.ensure_owner(user_id)?;

    match state.clients.fetch(user_id).await? {
        Some(profile) => Ok(ApiResponse::success(profile)),
        None => Err(ApiError::not_found(format!("No client profile for {}", user_id))),
    }
}
