use axum::extract::{Extension, State};

use crate::auth::Role;
use crate::database::models::Recipe;
use crate::middleware::{require_role, ApiResponse, ApiResult, AuthUser};
use crate::schemas::recipe::{RecipeCreate, RecipeUpdate};
use crate::schemas::IdParams;
use crate::state::AppState;
use crate::validation::extract::{ValidatedBody, ValidatedParams};

/// GET /api/recipes - List all recipes
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Recipe>> {
    Ok(ApiResponse::success(state.recipes.list().await?))
}

/// GET /api/recipes/:id - Get a single recipe by ID
pub async fn get(
    State(state): State<AppState>,
    ValidatedParams(params): ValidatedParams<IdParams>,
) -> ApiResult<Recipe> {
    Ok(ApiResponse::success(state.recipes.get(params.id).await?))
}

/// POST /api/recipes - Create a recipe owned by the caller
pub async fn create(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    ValidatedBody(body): ValidatedBody<RecipeCreate>,
) -> ApiResult<Recipe> {
    let caller = require_role(auth.as_deref(), &[Role::Admin, Role::User])?;

    let recipe = state.recipes.create(body, caller).await?;
    Ok(ApiResponse::created(recipe))
}

/// PATCH /api/recipes/:id - Partially update a recipe; children are
/// reconciled against persisted state by natural key
pub async fn update(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    ValidatedParams(params): ValidatedParams<IdParams>,
    ValidatedBody(body): ValidatedBody<RecipeUpdate>,
) -> ApiResult<Recipe> {
    require_role(auth.as_deref(), &[Role::Admin, Role::User])?;

    let recipe = state
        .recipes
        .update(params.id, body, auth.as_deref())
        .await?;
    Ok(ApiResponse::success(recipe))
}

/// DELETE /api/recipes/:id - Delete a recipe and its children
pub async fn remove(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    ValidatedParams(params): ValidatedParams<IdParams>,
) -> ApiResult<String> {
    require_role(auth.as_deref(), &[Role::Admin, Role::User])?;

    let message = state.recipes.delete(params.id, auth.as_deref()).await?;
    Ok(ApiResponse::success(message))
}
