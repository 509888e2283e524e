use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::Recipe;
use crate::database::store::{CategoryStore, RecipeChanges, RecipeStore};
use crate::error::ApiError;
use crate::middleware::{assert_ownership, AuthUser};
use crate::reconcile::reconcile;
use crate::schemas::recipe::{RecipeCreate, RecipeUpdate};

#[derive(Clone)]
pub struct RecipeService {
    recipes: Arc<dyn RecipeStore>,
    categories: Arc<dyn CategoryStore>,
}

impl RecipeService {
    pub fn new(recipes: Arc<dyn RecipeStore>, categories: Arc<dyn CategoryStore>) -> Self {
        Self { recipes, categories }
    }

    pub async fn create(&self, input: RecipeCreate, author: &AuthUser) -> Result<Recipe, ApiError> {
        if self.categories.find_by_id(input.category_id).await?.is_none() {
            return Err(ApiError::not_found("Category not found"));
        }

        Ok(self.recipes.create(author.user_id, input).await?)
    }

    pub async fn list(&self) -> Result<Vec<Recipe>, ApiError> {
        Ok(self.recipes.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Recipe, ApiError> {
        self.recipes
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Recipe not found"))
    }

    /// Partial update: the owner is resolved from the persisted recipe before
    /// the guard runs, then child collections are reconciled by natural key
    /// and handed to the store together with the scalar patch.
    pub async fn update(
        &self,
        id: Uuid,
        input: RecipeUpdate,
        caller: Option<&AuthUser>,
    ) -> Result<Recipe, ApiError> {
        let existing = self
            .recipes
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

        assert_ownership(caller, existing.author.id)?;

        if let Some(category_id) = input.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(ApiError::not_found("Category not found"));
            }
        }

        let ingredient_ops = reconcile(
            existing.ingredients.iter().map(|i| i.name.clone()),
            input.ingredients.as_deref(),
            |item| item.name.clone(),
        );
        let step_ops = reconcile(
            existing.steps.iter().map(|s| s.order),
            input.steps.as_deref(),
            |item| item.order,
        );

        let changes = RecipeChanges {
            title: input.title,
            description: input.description,
            prep_time: input.prep_time,
            cook_time: input.cook_time,
            servings: input.servings,
            difficulty: input.difficulty,
            image: input.image,
            category_id: input.category_id,
        };

        Ok(self
            .recipes
            .apply_update(id, changes, ingredient_ops, step_ops)
            .await?)
    }

    pub async fn delete(&self, id: Uuid, caller: Option<&AuthUser>) -> Result<String, ApiError> {
        let existing = self
            .recipes
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

        assert_ownership(caller, existing.author.id)?;

        self.recipes.delete(id).await?;
        Ok(format!("Recipe {} deleted", id))
    }
}
