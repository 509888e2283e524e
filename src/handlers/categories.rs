use axum::extract::State;

use crate::database::models::Category;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/categories - List categories in alphabetical order
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(state.categories.list().await?))
}
