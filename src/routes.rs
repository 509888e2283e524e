use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, categories, recipes, users};
use crate::middleware::identity_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Session issuance and registration
        .route("/api/auth/login", post(auth::login))
        .route("/api/users/register", post(users::register))
        // Users (list is admin-only, record routes are owner-only)
        .route("/api/users", get(users::list))
        .route(
            "/api/users/:id",
            get(users::get).patch(users::update).delete(users::remove),
        )
        // Recipes (reads are public, mutations require an authenticated owner)
        .route("/api/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/api/recipes/:id",
            get(recipes::get)
                .patch(recipes::update)
                .delete(recipes::remove),
        )
        // Categories
        .route("/api/categories", get(categories::list))
        // Global middleware
        .layer(middleware::from_fn(identity_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Recipe API (Rust)",
            "version": version,
            "description": "Recipe management backend API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/auth/login (public - token acquisition)",
                "register": "/api/users/register (public)",
                "users": "/api/users[/:id] (protected)",
                "recipes": "/api/recipes[/:id] (reads public, mutations protected)",
                "categories": "/api/categories (public)",
            }
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now()
        }
    }))
}
