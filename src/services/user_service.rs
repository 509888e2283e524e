use std::sync::Arc;

use uuid::Uuid;

use crate::auth::Role;
use crate::config;
use crate::database::models::User;
use crate::database::store::{NewUser, UserChanges, UserStore};
use crate::error::ApiError;
use crate::schemas::user::{NameFilter, UserCreate, UserUpdate};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn register(&self, input: UserCreate) -> Result<User, ApiError> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::conflict("Email is already registered"));
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create(NewUser {
                name: input.name,
                lastname: input.lastname,
                email: input.email,
                password_hash,
                role: Role::User,
                cel: input.cel,
                birthdate: input.birthdate,
                photo: input.photo,
            })
            .await?;

        Ok(user)
    }

    /// All users, or the subset matching the optional name/lastname filter.
    pub async fn list(&self, filter: Option<NameFilter>) -> Result<Vec<User>, ApiError> {
        match filter {
            None => Ok(self.users.list().await?),
            Some(filter) => Ok(self
                .users
                .search(filter.name.as_deref(), filter.lastname.as_deref())
                .await?),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn update(&self, id: Uuid, input: UserUpdate) -> Result<User, ApiError> {
        let existing = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if let Some(email) = &input.email {
            if email != &existing.email && self.users.find_by_email(email).await?.is_some() {
                return Err(ApiError::conflict("Email is already registered"));
            }
        }

        let password_hash = input.password.as_deref().map(hash_password).transpose()?;

        let changes = UserChanges {
            name: input.name,
            lastname: input.lastname,
            email: input.email,
            password_hash,
            cel: input.cel,
            birthdate: input.birthdate,
            photo: input.photo,
        };

        Ok(self.users.apply_update(id, changes).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<String, ApiError> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(ApiError::not_found("User not found"));
        }

        self.users.delete(id).await?;
        Ok(format!("User {} deleted", id))
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let cost = config::config().security.bcrypt_cost;
    bcrypt::hash(password, cost).map_err(|err| {
        tracing::error!("Password hashing failed: {}", err);
        ApiError::internal_server_error("Failed to process credentials")
    })
}
