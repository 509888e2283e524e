//! Validated request payloads. Each schema implements [`FromPayload`] with
//! the field rules from `validation::rules`, so the gateway can turn raw
//! JSON into a normalized, strongly-typed value or a field-error report.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::validation::{rules, FieldErrors, FromPayload, ObjectShape};

pub mod auth;
pub mod recipe;
pub mod user;

/// Path parameters of every `/:id` route.
#[derive(Debug, Clone, PartialEq)]
pub struct IdParams {
    pub id: Uuid,
}

impl FromPayload for IdParams {
    fn from_payload(input: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut shape = ObjectShape::new(input);
        let id = shape.required("id", rules::uuid);
        match id {
            Some(id) => {
                shape.finish()?;
                Ok(Self { id })
            }
            None => Err(shape.into_errors()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn id_params_require_a_well_formed_identifier() {
        let raw = json!({ "id": "not-a-uuid" });
        let errors = IdParams::from_payload(raw.as_object().unwrap()).unwrap_err();
        assert_eq!(errors["id"], vec!["Must be a valid UUID".to_string()]);

        let id = Uuid::new_v4();
        let raw = json!({ "id": id.to_string() });
        let parsed = IdParams::from_payload(raw.as_object().unwrap()).unwrap();
        assert_eq!(parsed.id, id);
    }
}
