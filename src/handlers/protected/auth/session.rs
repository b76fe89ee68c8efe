use axum::Extension;
use tracing::info;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::session::SessionUser;

/// GET /api/auth/whoami - identity carried by the bearer token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<SessionUser> {
    Ok(ApiResponse::success(SessionUser {
        id: user.user_id,
        email: user.email,
    }))
}

/// DELETE /api/auth/session - sign out
///
/// Tokens are stateless, so this only records the event; the caller drops
/// its cached session.
pub async fn logout(Extension(user): Extension<AuthUser>) -> ApiResult<()> {
    info!("User {} signed out", user.user_id);
    Ok(ApiResponse::<()>::no_content())
}
