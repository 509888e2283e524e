use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::validation::{rules, FieldErrors, FromPayload, ObjectShape};

/// Placeholder used when registration supplies no photo.
pub const DEFAULT_PHOTO_URL: &str =
    "https://cdn-icons-png.flaticon.com/512/12225/12225881.png";

/// Payload of `POST /api/users/register`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCreate {
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub cel: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub photo: String,
}

/// Payload of `PATCH /api/users/:id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub cel: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub photo: Option<String>,
}

/// Query filter of `GET /api/users`: when the query is non-empty, at least
/// one of the two fields must be supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameFilter {
    pub name: Option<String>,
    pub lastname: Option<String>,
}

fn name(value: &Value) -> Result<String, String> {
    rules::trimmed_min(value, 2, "Name is required")
}

fn lastname(value: &Value) -> Result<String, String> {
    rules::trimmed_min(value, 1, "Lastname is required")
}

fn password(value: &Value) -> Result<String, String> {
    rules::trimmed_min(value, 4, "Required minimum 4 characters")
}

impl FromPayload for UserCreate {
    fn from_payload(input: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut shape = ObjectShape::new(input);

        let name = shape.required("name", name);
        let lastname = shape.required("lastname", lastname);
        let email = shape.required("email", rules::email);
        let password = shape.required("password", password);
        let cel = shape.optional("cel", rules::string_or_number);
        let birthdate = shape.optional("birthdate", rules::iso_date);
        let photo = shape
            .optional("photo", rules::https_url)
            .unwrap_or_else(|| DEFAULT_PHOTO_URL.to_string());

        match (name, lastname, email, password) {
            (Some(name), Some(lastname), Some(email), Some(password)) => {
                shape.finish()?;
                Ok(Self {
                    name,
                    lastname,
                    email,
                    password,
                    cel,
                    birthdate,
                    photo,
                })
            }
            _ => Err(shape.into_errors()),
        }
    }
}

impl FromPayload for UserUpdate {
    fn from_payload(input: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut shape = ObjectShape::new(input);

        let name = shape.optional("name", name);
        let lastname = shape.optional("lastname", lastname);
        let email = shape.optional("email", rules::email);
        let password = shape.optional("password", password);
        let cel = shape.optional("cel", rules::string_or_number);
        let birthdate = shape.optional("birthdate", rules::iso_date);
        let photo = shape.optional("photo", rules::https_url);

        shape.finish()?;
        Ok(Self {
            name,
            lastname,
            email,
            password,
            cel,
            birthdate,
            photo,
        })
    }
}

impl FromPayload for NameFilter {
    fn from_payload(input: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut shape = ObjectShape::new(input);

        let name = shape.optional("name", name);
        let lastname = shape.optional("lastname", lastname);

        if name.is_none() && lastname.is_none() && shape.is_clean() {
            shape.push_error("name", "Name or lastname is required");
        }

        shape.finish()?;
        Ok(Self { name, lastname })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_create() -> Value {
        json!({
            "name": "Ana",
            "lastname": "Gomez",
            "email": "Ana@Example.COM",
            "password": "secret",
        })
    }

    #[test]
    fn create_normalizes_email_and_defaults_photo() {
        let raw = valid_create();
        let parsed = UserCreate::from_payload(raw.as_object().unwrap()).unwrap();

        assert_eq!(parsed.email, "ana@example.com");
        assert_eq!(parsed.photo, DEFAULT_PHOTO_URL);
        assert!(parsed.cel.is_none());
    }

    #[test]
    fn create_coerces_numeric_phone_to_text() {
        let mut raw = valid_create();
        raw["cel"] = json!(1122334455_i64);

        let parsed = UserCreate::from_payload(raw.as_object().unwrap()).unwrap();
        assert_eq!(parsed.cel.as_deref(), Some("1122334455"));
    }

    #[test]
    fn create_trims_and_bounds_text_fields() {
        let mut raw = valid_create();
        raw["name"] = json!("  A  ");
        raw["password"] = json!("  abc ");

        let errors = UserCreate::from_payload(raw.as_object().unwrap()).unwrap_err();
        assert_eq!(errors["name"], vec!["Name is required".to_string()]);
        assert_eq!(
            errors["password"],
            vec!["Required minimum 4 characters".to_string()]
        );
    }

    #[test]
    fn create_rejects_insecure_photo_urls() {
        let mut raw = valid_create();
        raw["photo"] = json!("http://example.com/me.png");

        let errors = UserCreate::from_payload(raw.as_object().unwrap()).unwrap_err();
        assert!(errors.contains_key("photo"));
    }

    #[test]
    fn update_is_fully_partial() {
        let raw = json!({ "lastname": "Lopez" });
        let parsed = UserUpdate::from_payload(raw.as_object().unwrap()).unwrap();

        assert_eq!(parsed.lastname.as_deref(), Some("Lopez"));
        assert!(parsed.name.is_none());
        assert!(parsed.photo.is_none());
    }

    #[test]
    fn filter_requires_name_or_lastname() {
        let raw = json!({ "unrelated": "x" });
        let errors = NameFilter::from_payload(raw.as_object().unwrap()).unwrap_err();
        assert_eq!(errors["name"], vec!["Name or lastname is required".to_string()]);

        let raw = json!({ "lastname": "Gomez" });
        let parsed = NameFilter::from_payload(raw.as_object().unwrap()).unwrap();
        assert_eq!(parsed.lastname.as_deref(), Some("Gomez"));
    }
}
