use std::sync::Arc;

use sqlx::PgPool;

use crate::database::memory::MemoryStore;
use crate::database::postgres::{PgCategoryStore, PgRecipeStore, PgUserStore};
use crate::database::store::{CategoryStore, RecipeStore, UserStore};
use crate::services::{AuthService, RecipeService, UserService};

/// Shared application state: services over store capability traits, so the
/// same router runs against Postgres in production and the in-memory store
/// in the end-to-end suite.
#[derive(Clone)]
pub struct AppState {
    pub recipes: RecipeService,
    pub users: UserService,
    pub auth: AuthService,
    pub categories: Arc<dyn CategoryStore>,
}

impl AppState {
    pub fn postgres(pool: PgPool) -> Self {
        let recipes: Arc<dyn RecipeStore> = Arc::new(PgRecipeStore::new(pool.clone()));
        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
        let categories: Arc<dyn CategoryStore> = Arc::new(PgCategoryStore::new(pool));
        Self::from_stores(recipes, users, categories)
    }

    /// In-memory state with a few seeded categories; the store handle is
    /// returned so tests can plant additional fixtures.
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_categories(&[
            "Desserts",
            "Main dishes",
            "Salads",
        ]));
        let state = Self::from_stores(store.clone(), store.clone(), store.clone());
        (state, store)
    }

    pub fn from_stores(
        recipes: Arc<dyn RecipeStore>,
        users: Arc<dyn UserStore>,
        categories: Arc<dyn CategoryStore>,
    ) -> Self {
        Self {
            recipes: RecipeService::new(recipes, categories.clone()),
            users: UserService::new(users.clone()),
            auth: AuthService::new(users),
            categories,
        }
    }
}
