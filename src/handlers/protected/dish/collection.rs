use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use super::check_dish;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::DishItem;
use crate::server::AppState;

/// GET /api/dishes/:user_id - the owner's dishes in insertion order
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Vec<DishItem>> {
    user.ensure_owner(user_id)?;
    Ok(ApiResponse::success(state.dishes.fetch_all(user_id).await?))
}

/// POST /api/dish - create a dish; the server assigns the id
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(dish): Json<DishItem>,
) -> ApiResult<DishItem> {
    user.ensure_owner(dish.user_id)?;
    check_dish(&dish)?;

    let stored = state.dishes.insert(&dish).await?;
    Ok(ApiResponse::created(stored))
}
