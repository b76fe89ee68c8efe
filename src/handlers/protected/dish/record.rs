use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use super::check_dish;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::DishItem;
use crate::server::AppState;

/// PUT /api/dish/:id - replace one of the caller's dishes
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(dish): Json<DishItem>,
) -> ApiResult<DishItem> {
    user.ensure_owner(dish.user_id)?;
    check_dish(&dish)?;

    let stored = state.dishes.update(id, &dish).await?;
    Ok(ApiResponse::success(stored))
}

/// DELETE /api/dish/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.dishes.delete(id, user.user_id).await?;
    info!("User {} deleted dish {}", user.user_id, id);
    Ok(ApiResponse::<()>::no_content())
}
