//! Axum extractors wrapping the validation gateway. Each extractor populates
//! exactly one typed slot (body, query, or path params) and leaves the raw
//! request untouched.

use std::collections::HashMap;

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde_json::{Map, Value};

use crate::error::ApiError;

use super::{validate_optional, validate_required, FromPayload, Target};

/// Sanitized and validated JSON body.
pub struct ValidatedBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedBody<T>
where
    S: Send + Sync,
    T: FromPayload,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request(format!("Invalid JSON body: {}", err)))?;

        let Value::Object(raw) = value else {
            return Err(ApiError::bad_request("Request body must be a JSON object"));
        };

        Ok(Self(validate_required(Target::Body, &raw)?))
    }
}

/// Validated query string; an empty query skips validation and yields `None`.
pub struct OptionalQuery<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequestParts<S> for OptionalQuery<T>
where
    S: Send + Sync,
    T: FromPayload,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|err| ApiError::bad_request(format!("Invalid query string: {}", err)))?;

        let raw = to_value_map(params);
        Ok(Self(validate_optional(Target::Query, &raw)?))
    }
}

/// Validated path parameters.
pub struct ValidatedParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedParams<T>
where
    S: Send + Sync,
    T: FromPayload,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|err| ApiError::bad_request(format!("Invalid path parameters: {}", err)))?;

        let raw = to_value_map(params);
        Ok(Self(validate_required(Target::Params, &raw)?))
    }
}

fn to_value_map(params: HashMap<String, String>) -> Map<String, Value> {
    params
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}
