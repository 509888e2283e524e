//! sqlx/Postgres implementations of the store capability traits. Recipe
//! updates run the scalar patch and every child operation inside a single
//! transaction; conflicting concurrent writes are serialized by the store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{
    AuthorSummary, Category, CategorySummary, Difficulty, Ingredient, Recipe, Step, User,
};
use crate::database::store::{
    CategoryStore, NewUser, RecipeChanges, RecipeStore, StoreError, UserChanges, UserStore,
};
use crate::reconcile::ChildOp;
use crate::schemas::recipe::{IngredientInput, RecipeCreate, StepInput};

const RECIPE_SELECT: &str = r#"
    SELECT r.id, r.title, r.description, r.prep_time, r.cook_time, r.servings,
           r.difficulty, r.image,
           u.id AS author_id, u.name AS author_name, u.lastname AS author_lastname,
           c.id AS category_id, c.name AS category_name,
           r.created_at, r.updated_at
    FROM recipes r
    JOIN users u ON u.id = r.author_id
    JOIN categories c ON c.id = r.category_id
"#;

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    prep_time: Option<i32>,
    cook_time: Option<i32>,
    servings: Option<i32>,
    difficulty: Option<String>,
    image: Option<String>,
    author_id: Uuid,
    author_name: String,
    author_lastname: String,
    category_id: Uuid,
    category_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RecipeRow {
    fn into_recipe(self, ingredients: Vec<Ingredient>, steps: Vec<Step>) -> Result<Recipe, StoreError> {
        let difficulty = self
            .difficulty
            .as_deref()
            .map(str::parse::<Difficulty>)
            .transpose()
            .map_err(StoreError::Data)?;

        Ok(Recipe {
            id: self.id,
            title: self.title,
            description: self.description,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
            difficulty,
            image: self.image,
            author: AuthorSummary {
                id: self.author_id,
                name: self.author_name,
                lastname: self.author_lastname,
            },
            category: CategorySummary {
                id: self.category_id,
                name: self.category_name,
            },
            ingredients,
            steps,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct IngredientRow {
    recipe_id: Uuid,
    name: String,
    quantity: Option<String>,
    unit: Option<String>,
}

#[derive(sqlx::FromRow)]
struct StepRow {
    recipe_id: Uuid,
    order: i32,
    description: String,
}

pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_children(
        &self,
        ids: &[Uuid],
    ) -> Result<(HashMap<Uuid, Vec<Ingredient>>, HashMap<Uuid, Vec<Step>>), StoreError> {
        let ingredient_rows = sqlx::query_as::<_, IngredientRow>(
            r#"SELECT recipe_id, name, quantity, unit
               FROM recipe_ingredients
               WHERE recipe_id = ANY($1)
               ORDER BY name ASC"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let step_rows = sqlx::query_as::<_, StepRow>(
            r#"SELECT recipe_id, "order", description
               FROM recipe_steps
               WHERE recipe_id = ANY($1)
               ORDER BY "order" ASC"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut ingredients: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
        for row in ingredient_rows {
            ingredients.entry(row.recipe_id).or_default().push(Ingredient {
                name: row.name,
                quantity: row.quantity,
                unit: row.unit,
            });
        }

        let mut steps: HashMap<Uuid, Vec<Step>> = HashMap::new();
        for row in step_rows {
            steps.entry(row.recipe_id).or_default().push(Step {
                order: row.order,
                description: row.description,
            });
        }

        Ok((ingredients, steps))
    }

    async fn apply_child_ops(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: Uuid,
        ingredients: &[ChildOp<IngredientInput>],
        steps: &[ChildOp<StepInput>],
    ) -> Result<(), StoreError> {
        for op in ingredients {
            match op {
                ChildOp::Update(item) => {
                    sqlx::query(
                        r#"UPDATE recipe_ingredients SET quantity = $3, unit = $4
                           WHERE recipe_id = $1 AND name = $2"#,
                    )
                    .bind(recipe_id)
                    .bind(&item.name)
                    .bind(&item.quantity)
                    .bind(&item.unit)
                    .execute(&mut **tx)
                    .await?;
                }
                ChildOp::Insert(item) => {
                    sqlx::query(
                        r#"INSERT INTO recipe_ingredients (recipe_id, name, quantity, unit)
                           VALUES ($1, $2, $3, $4)"#,
                    )
                    .bind(recipe_id)
                    .bind(&item.name)
                    .bind(&item.quantity)
                    .bind(&item.unit)
                    .execute(&mut **tx)
                    .await?;
                }
            }
        }

        for op in steps {
            match op {
                ChildOp::Update(item) => {
                    sqlx::query(
                        r#"UPDATE recipe_steps SET description = $3
                           WHERE recipe_id = $1 AND "order" = $2"#,
                    )
                    .bind(recipe_id)
                    .bind(item.order)
                    .bind(&item.description)
                    .execute(&mut **tx)
                    .await?;
                }
                ChildOp::Insert(item) => {
                    sqlx::query(
                        r#"INSERT INTO recipe_steps (recipe_id, "order", description)
                           VALUES ($1, $2, $3)"#,
                    )
                    .bind(recipe_id)
                    .bind(item.order)
                    .bind(&item.description)
                    .execute(&mut **tx)
                    .await?;
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        let sql = format!("{} ORDER BY r.created_at DESC", RECIPE_SELECT);
        let rows = sqlx::query_as::<_, RecipeRow>(&sql).fetch_all(&self.pool).await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let (mut ingredients, mut steps) = self.load_children(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                row.into_recipe(
                    ingredients.remove(&id).unwrap_or_default(),
                    steps.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, StoreError> {
        let sql = format!("{} WHERE r.id = $1", RECIPE_SELECT);
        let Some(row) = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let (mut ingredients, mut steps) = self.load_children(&[id]).await?;
        let recipe = row.into_recipe(
            ingredients.remove(&id).unwrap_or_default(),
            steps.remove(&id).unwrap_or_default(),
        )?;

        Ok(Some(recipe))
    }

    async fn create(&self, author_id: Uuid, input: RecipeCreate) -> Result<Recipe, StoreError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO recipes
                   (id, title, description, prep_time, cook_time, servings,
                    difficulty, image, author_id, category_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.prep_time)
        .bind(input.cook_time)
        .bind(input.servings)
        .bind(input.difficulty.map(|d| d.as_str()))
        .bind(&input.image)
        .bind(author_id)
        .bind(input.category_id)
        .execute(&mut *tx)
        .await?;

        for item in &input.ingredients {
            sqlx::query(
                r#"INSERT INTO recipe_ingredients (recipe_id, name, quantity, unit)
                   VALUES ($1, $2, $3, $4)"#,
            )
            .bind(id)
            .bind(&item.name)
            .bind(&item.quantity)
            .bind(&item.unit)
            .execute(&mut *tx)
            .await?;
        }

        for item in &input.steps {
            sqlx::query(
                r#"INSERT INTO recipe_steps (recipe_id, "order", description)
                   VALUES ($1, $2, $3)"#,
            )
            .bind(id)
            .bind(item.order)
            .bind(&item.description)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Recipe not found after create".to_string()))
    }

    async fn apply_update(
        &self,
        id: Uuid,
        changes: RecipeChanges,
        ingredients: Vec<ChildOp<IngredientInput>>,
        steps: Vec<ChildOp<StepInput>>,
    ) -> Result<Recipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE recipes SET
                   title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   prep_time = COALESCE($4, prep_time),
                   cook_time = COALESCE($5, cook_time),
                   servings = COALESCE($6, servings),
                   difficulty = COALESCE($7, difficulty),
                   image = COALESCE($8, image),
                   category_id = COALESCE($9, category_id),
                   updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.prep_time)
        .bind(changes.cook_time)
        .bind(changes.servings)
        .bind(changes.difficulty.map(|d| d.as_str()))
        .bind(&changes.image)
        .bind(changes.category_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("Recipe not found".to_string()));
        }

        Self::apply_child_ops(&mut tx, id, &ingredients, &steps).await?;

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Recipe not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_steps WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound("Recipe not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}

const USER_SELECT: &str = r#"
    SELECT id, name, lastname, email, password, role, cel, birthdate, photo,
           created_at, updated_at
    FROM users
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    lastname: String,
    email: String,
    password: String,
    role: String,
    cel: Option<String>,
    birthdate: Option<NaiveDate>,
    photo: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(StoreError::Data)?;

        Ok(User {
            id: row.id,
            name: row.name,
            lastname: row.lastname,
            email: row.email,
            password: row.password,
            role,
            cel: row.cel,
            birthdate: row.birthdate,
            photo: row.photo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a unique-constraint violation to a client-visible conflict.
fn conflict_on_unique(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("{} WHERE id = $1", USER_SELECT);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("{} ORDER BY created_at ASC", USER_SELECT);
        let rows = sqlx::query_as::<_, UserRow>(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn search(
        &self,
        name: Option<&str>,
        lastname: Option<&str>,
    ) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            r#"{} WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
                 AND ($2::text IS NULL OR lastname ILIKE '%' || $2 || '%')
               ORDER BY created_at ASC"#,
            USER_SELECT
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(name)
            .bind(lastname)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.fetch_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("{} WHERE email = $1", USER_SELECT);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"INSERT INTO users
                   (id, name, lastname, email, password, role, cel, birthdate, photo)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.lastname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.cel)
        .bind(user.birthdate)
        .bind(&user.photo)
        .execute(&self.pool)
        .await
        .map_err(|err| conflict_on_unique(err, "Email is already registered"))?;

        self.fetch_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("User not found after create".to_string()))
    }

    async fn apply_update(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let updated = sqlx::query(
            r#"UPDATE users SET
                   name = COALESCE($2, name),
                   lastname = COALESCE($3, lastname),
                   email = COALESCE($4, email),
                   password = COALESCE($5, password),
                   cel = COALESCE($6, cel),
                   birthdate = COALESCE($7, birthdate),
                   photo = COALESCE($8, photo),
                   updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.lastname)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(&changes.cel)
        .bind(changes.birthdate)
        .bind(&changes.photo)
        .execute(&self.pool)
        .await
        .map_err(|err| conflict_on_unique(err, "Email is already registered"))?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("User not found".to_string()));
        }

        self.fetch_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Recipes cascade with the author
        sqlx::query(
            r#"DELETE FROM recipe_ingredients
               WHERE recipe_id IN (SELECT id FROM recipes WHERE author_id = $1)"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"DELETE FROM recipe_steps
               WHERE recipe_id IN (SELECT id FROM recipes WHERE author_id = $1)"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM recipes WHERE author_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound("User not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}

pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }
}
