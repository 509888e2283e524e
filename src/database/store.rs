//! Capability interfaces over the collection store, one per aggregate type.
//! Absence is always an explicit `Option`, never an overloaded sentinel.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::models::{Category, Difficulty, Recipe, User};
use crate::reconcile::ChildOp;
use crate::schemas::recipe::{IngredientInput, RecipeCreate, StepInput};

/// Errors from store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid stored value: {0}")]
    Data(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Scalar fields of a recipe, merged by overwrite-if-present.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub lastname: String,
    pub email: String,
    /// Already hashed; stores never see plaintext passwords.
    pub password_hash: String,
    pub role: Role,
    pub cel: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub photo: String,
}

/// Scalar fields of a user, merged by overwrite-if-present.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub cel: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub photo: Option<String>,
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Recipe>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, StoreError>;

    async fn create(&self, author_id: Uuid, input: RecipeCreate) -> Result<Recipe, StoreError>;

    /// Apply the scalar patch and the reconciled child operations as one
    /// atomic batch, returning the converged aggregate.
    async fn apply_update(
        &self,
        id: Uuid,
        changes: RecipeChanges,
        ingredients: Vec<ChildOp<IngredientInput>>,
        steps: Vec<ChildOp<StepInput>>,
    ) -> Result<Recipe, StoreError>;

    /// Delete a recipe and its children.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Case-insensitive contains match over name and/or lastname.
    async fn search(
        &self,
        name: Option<&str>,
        lastname: Option<&str>,
    ) -> Result<Vec<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn apply_update(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError>;

    /// Delete a user and the recipes they authored.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Categories in alphabetical order.
    async fn list(&self) -> Result<Vec<Category>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError>;
}
