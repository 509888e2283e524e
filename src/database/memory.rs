//! In-memory store backing the end-to-end test suite. One shared state
//! implements every capability trait so recipe aggregates can resolve their
//! author and category summaries without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::Role;
use crate::config;
use crate::database::models::{
    AuthorSummary, Category, CategorySummary, Difficulty, Ingredient, Recipe, Step, User,
};
use crate::database::store::{
    CategoryStore, NewUser, RecipeChanges, RecipeStore, StoreError, UserChanges, UserStore,
};
use crate::reconcile::ChildOp;
use crate::schemas::recipe::{IngredientInput, RecipeCreate, StepInput};
use crate::schemas::user::DEFAULT_PHOTO_URL;

pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    categories: Vec<Category>,
    recipes: HashMap<Uuid, StoredRecipe>,
}

#[derive(Clone)]
struct StoredRecipe {
    id: Uuid,
    title: String,
    description: Option<String>,
    prep_time: Option<i32>,
    cook_time: Option<i32>,
    servings: Option<i32>,
    difficulty: Option<Difficulty>,
    image: Option<String>,
    author_id: Uuid,
    category_id: Uuid,
    ingredients: Vec<Ingredient>,
    steps: Vec<Step>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// Store pre-populated with a few categories, the minimum fixture the
    /// recipe routes need.
    pub fn with_categories(names: &[&str]) -> Self {
        let now = Utc::now();
        let categories = names
            .iter()
            .map(|name| Category {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        Self {
            state: RwLock::new(MemoryState {
                categories,
                ..MemoryState::default()
            }),
        }
    }

    /// Register an administrator with a known password, for tests that
    /// exercise role-restricted routes.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let cost = config::config().security.bcrypt_cost;
        let password_hash =
            bcrypt::hash(password, cost).map_err(|err| StoreError::Data(err.to_string()))?;

        UserStore::create(self, NewUser {
            name: "Admin".to_string(),
            lastname: "Root".to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::Admin,
            cel: None,
            birthdate: None,
            photo: DEFAULT_PHOTO_URL.to_string(),
        })
        .await
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn assemble(state: &MemoryState, stored: &StoredRecipe) -> Result<Recipe, StoreError> {
    let author = state
        .users
        .get(&stored.author_id)
        .ok_or_else(|| StoreError::Data(format!("missing author {}", stored.author_id)))?;
    let category = state
        .categories
        .iter()
        .find(|c| c.id == stored.category_id)
        .ok_or_else(|| StoreError::Data(format!("missing category {}", stored.category_id)))?;

    let mut ingredients = stored.ingredients.clone();
    ingredients.sort_by(|a, b| a.name.cmp(&b.name));
    let mut steps = stored.steps.clone();
    steps.sort_by_key(|s| s.order);

    Ok(Recipe {
        id: stored.id,
        title: stored.title.clone(),
        description: stored.description.clone(),
        prep_time: stored.prep_time,
        cook_time: stored.cook_time,
        servings: stored.servings,
        difficulty: stored.difficulty,
        image: stored.image.clone(),
        author: AuthorSummary {
            id: author.id,
            name: author.name.clone(),
            lastname: author.lastname.clone(),
        },
        category: CategorySummary {
            id: category.id,
            name: category.name.clone(),
        },
        ingredients,
        steps,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    })
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        let state = self.state.read().await;
        let mut stored: Vec<&StoredRecipe> = state.recipes.values().collect();
        stored.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        stored.into_iter().map(|r| assemble(&state, r)).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, StoreError> {
        let state = self.state.read().await;
        state
            .recipes
            .get(&id)
            .map(|stored| assemble(&state, stored))
            .transpose()
    }

    async fn create(&self, author_id: Uuid, input: RecipeCreate) -> Result<Recipe, StoreError> {
        let now = Utc::now();
        let stored = StoredRecipe {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            prep_time: input.prep_time,
            cook_time: input.cook_time,
            servings: input.servings,
            difficulty: input.difficulty,
            image: input.image,
            author_id,
            category_id: input.category_id,
            ingredients: input.ingredients.into_iter().map(ingredient_from).collect(),
            steps: input.steps.into_iter().map(step_from).collect(),
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        let recipe_id = stored.id;
        state.recipes.insert(recipe_id, stored);
        let stored = &state.recipes[&recipe_id];
        assemble(&state, stored)
    }

    async fn apply_update(
        &self,
        id: Uuid,
        changes: RecipeChanges,
        ingredients: Vec<ChildOp<IngredientInput>>,
        steps: Vec<ChildOp<StepInput>>,
    ) -> Result<Recipe, StoreError> {
        let mut state = self.state.write().await;
        let stored = state
            .recipes
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Recipe not found".to_string()))?;

        if let Some(title) = changes.title {
            stored.title = title;
        }
        if let Some(description) = changes.description {
            stored.description = Some(description);
        }
        if let Some(prep_time) = changes.prep_time {
            stored.prep_time = Some(prep_time);
        }
        if let Some(cook_time) = changes.cook_time {
            stored.cook_time = Some(cook_time);
        }
        if let Some(servings) = changes.servings {
            stored.servings = Some(servings);
        }
        if let Some(difficulty) = changes.difficulty {
            stored.difficulty = Some(difficulty);
        }
        if let Some(image) = changes.image {
            stored.image = Some(image);
        }
        if let Some(category_id) = changes.category_id {
            stored.category_id = category_id;
        }

        for op in ingredients {
            match op {
                ChildOp::Update(item) => {
                    if let Some(existing) =
                        stored.ingredients.iter_mut().find(|i| i.name == item.name)
                    {
                        existing.quantity = item.quantity;
                        existing.unit = item.unit;
                    }
                }
                ChildOp::Insert(item) => stored.ingredients.push(ingredient_from(item)),
            }
        }

        for op in steps {
            match op {
                ChildOp::Update(item) => {
                    if let Some(existing) = stored.steps.iter_mut().find(|s| s.order == item.order)
                    {
                        existing.description = item.description;
                    }
                }
                ChildOp::Insert(item) => stored.steps.push(step_from(item)),
            }
        }

        stored.updated_at = Utc::now();

        let stored = stored.clone();
        assemble(&state, &stored)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .recipes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Recipe not found".to_string()))
    }
}

fn ingredient_from(input: IngredientInput) -> Ingredient {
    Ingredient {
        name: input.name,
        quantity: input.quantity,
        unit: input.unit,
    }
}

fn step_from(input: StepInput) -> Step {
    Step {
        order: input.order,
        description: input.description,
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn search(
        &self,
        name: Option<&str>,
        lastname: Option<&str>,
    ) -> Result<Vec<User>, StoreError> {
        let name = name.map(str::to_lowercase);
        let lastname = lastname.map(str::to_lowercase);

        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|user| {
                name.as_deref()
                    .map_or(true, |n| user.name.to_lowercase().contains(n))
                    && lastname
                        .as_deref()
                        .map_or(true, |l| user.lastname.to_lowercase().contains(l))
            })
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("Email is already registered".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            lastname: user.lastname,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            cel: user.cel,
            birthdate: user.birthdate,
            photo: user.photo,
            created_at: now,
            updated_at: now,
        };

        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn apply_update(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if let Some(email) = &changes.email {
            if state.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Conflict("Email is already registered".to_string()));
            }
        }

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(lastname) = changes.lastname {
            user.lastname = lastname;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password = password_hash;
        }
        if let Some(cel) = changes.cel {
            user.cel = Some(cel);
        }
        if let Some(birthdate) = changes.birthdate {
            user.birthdate = Some(birthdate);
        }
        if let Some(photo) = changes.photo {
            user.photo = photo;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if state.users.remove(&id).is_none() {
            return Err(StoreError::NotFound("User not found".to_string()));
        }

        // Recipes cascade with the author
        state.recipes.retain(|_, recipe| recipe.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let state = self.state.read().await;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }
}
