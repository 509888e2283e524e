use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::{Claims, Role};
use crate::config;
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

/// Middleware that resolves the caller's identity from the Authorization
/// header. Requests without the header pass through anonymously; ownership
/// and role checks downstream decide whether that is acceptable. A header
/// that is present but invalid is rejected outright.
pub async fn identity_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = bearer_token(&headers)? {
        let claims = decode_token(&token)?;
        request.extensions_mut().insert(AuthUser::from(claims));
    }

    Ok(next.run(request).await)
}

/// Extract the bearer token, if any, from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(header) = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
    else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    let Some(token) = value.strip_prefix("Bearer ") else {
        return Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        ));
    };

    if token.trim().is_empty() {
        return Err(ApiError::unauthorized("Empty bearer token"));
    }

    Ok(Some(token.to_string()))
}

/// Validate the token and extract its claims
fn decode_token(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(ApiError::unauthorized("JWT secret not configured"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|err| {
        tracing::warn!("Rejected bearer token: {}", err);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    Ok(token_data.claims)
}
