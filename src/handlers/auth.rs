use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::schemas::auth::LoginRequest;
use crate::services::LoginResponse;
use crate::state::AppState;
use crate::validation::extract::ValidatedBody;

/// POST /api/auth/login - Exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(ApiResponse::success(state.auth.login(body).await?))
}
