use serde_json::{Map, Value};

use crate::validation::{rules, FieldErrors, FromPayload, ObjectShape};

/// Payload of `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl FromPayload for LoginRequest {
    fn from_payload(input: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut shape = ObjectShape::new(input);

        let email = shape.required("email", rules::email);
        let password = shape.required("password", rules::non_empty);

        match (email, password) {
            (Some(email), Some(password)) => {
                shape.finish()?;
                Ok(Self { email, password })
            }
            _ => Err(shape.into_errors()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn login_lowercases_email_and_requires_password() {
        let raw = json!({ "email": "Ana@Example.COM", "password": "secret" });
        let parsed = LoginRequest::from_payload(raw.as_object().unwrap()).unwrap();
        assert_eq!(parsed.email, "ana@example.com");

        let raw = json!({ "email": "ana@example.com" });
        let errors = LoginRequest::from_payload(raw.as_object().unwrap()).unwrap_err();
        assert_eq!(errors["password"], vec!["Required".to_string()]);
    }
}
