use axum::extract::{Extension, State};
use serde_json::{json, Value};

use crate::auth::Role;
use crate::database::models::User;
use crate::middleware::{assert_ownership, require_role, ApiResponse, ApiResult, AuthUser};
use crate::schemas::user::{NameFilter, UserCreate, UserUpdate};
use crate::schemas::IdParams;
use crate::state::AppState;
use crate::validation::extract::{OptionalQuery, ValidatedBody, ValidatedParams};

/// POST /api/users/register - Register a new account (public)
pub async fn register(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<UserCreate>,
) -> ApiResult<Value> {
    let user = state.users.register(body).await?;

    Ok(ApiResponse::success(json!({
        "message": "User created successfully",
        "id": user.id,
    })))
}

/// GET /api/users - List users, optionally filtered by name/lastname.
/// Admin only; an empty query skips filter validation entirely.
pub async fn list(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    OptionalQuery(filter): OptionalQuery<NameFilter>,
) -> ApiResult<Vec<User>> {
    require_role(auth.as_deref(), &[Role::Admin])?;

    Ok(ApiResponse::success(state.users.list(filter).await?))
}

/// GET /api/users/:id - Fetch a user record; callers may only read their own
pub async fn get(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    ValidatedParams(params): ValidatedParams<IdParams>,
) -> ApiResult<User> {
    require_role(auth.as_deref(), &[Role::Admin, Role::User])?;
    assert_ownership(auth.as_deref(), params.id)?;

    Ok(ApiResponse::success(state.users.get(params.id).await?))
}

/// PATCH /api/users/:id - Partially update the caller's own record
pub async fn update(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    ValidatedParams(params): ValidatedParams<IdParams>,
    ValidatedBody(body): ValidatedBody<UserUpdate>,
) -> ApiResult<User> {
    require_role(auth.as_deref(), &[Role::Admin, Role::User])?;
    assert_ownership(auth.as_deref(), params.id)?;

    Ok(ApiResponse::success(state.users.update(params.id, body).await?))
}

/// DELETE /api/users/:id - Delete the caller's own record
pub async fn remove(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    ValidatedParams(params): ValidatedParams<IdParams>,
) -> ApiResult<String> {
    require_role(auth.as_deref(), &[Role::Admin, Role::User])?;
    assert_ownership(auth.as_deref(), params.id)?;

    Ok(ApiResponse::success(state.users.delete(params.id).await?))
}
