use axum::{extract::State, Json};

use super::CredentialsRequest;
use crate::gateway::IdentityProvider;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;
use crate::session::Session;

/// POST /auth/signin - exchange credentials for a bearer token
pub async fn signin_post(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> ApiResult<Session> {
    let session = state.auth.sign_in(&body.email, &body.password).await?;
    Ok(ApiResponse::success(session))
}
