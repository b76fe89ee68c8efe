use axum::{extract::State, Json};
use tracing::info;

use super::CredentialsRequest;
use crate::gateway::IdentityProvider;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;
use crate::session::Session;

/// POST /auth/signup - create an identity and return its first session
///
/// The client profile is written separately (`POST /api/client`) with the
/// returned token.
pub async fn signup_post(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> ApiResult<Session> {
    let session = state.auth.sign_up(&body.email, &body.password).await?;
    info!("Issued first session for {}", session.user.id);
    Ok(ApiResponse::created(session))
}
