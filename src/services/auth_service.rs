use std::sync::Arc;

use serde::Serialize;

use crate::auth::{generate_jwt, Claims};
use crate::database::models::User;
use crate::database::store::UserStore;
use crate::error::ApiError;
use crate::schemas::auth::LoginRequest;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Verify credentials and issue a signed token. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(&self, input: LoginRequest) -> Result<LoginResponse, ApiError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

        let matches = bcrypt::verify(&input.password, &user.password).map_err(|err| {
            tracing::error!("Password verification failed: {}", err);
            ApiError::internal_server_error("Failed to process credentials")
        })?;

        if !matches {
            return Err(ApiError::unauthorized("Invalid email or password"));
        }

        let claims = Claims::new(user.id, user.role);
        let token = generate_jwt(&claims).map_err(|err| {
            tracing::error!("Token generation failed: {}", err);
            ApiError::internal_server_error("Failed to issue token")
        })?;

        Ok(LoginResponse { token, user })
    }
}
