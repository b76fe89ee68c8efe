use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{catalog, CuisineCatalogEntry};

/// GET /api/cuisines - every cuisine with its subtype list
pub async fn list(Extension(_user): Extension<AuthUser>) -> ApiResult<Vec<CuisineCatalogEntry>> {
    Ok(ApiResponse::success(catalog()))
}
