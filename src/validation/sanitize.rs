use serde_json::{Map, Value};

/// A value the client supplied but left empty. Such fields are treated as
/// "not supplied" rather than "supplied as empty".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

/// Produce a copy of `input` without its blank fields. Keys named in
/// `bulk_fields` survive unchanged regardless of emptiness: for those, an
/// empty array carries meaning the validation rules must see.
pub fn sanitize(input: &Map<String, Value>, bulk_fields: &[&str]) -> Map<String, Value> {
    input
        .iter()
        .filter(|(key, value)| bulk_fields.contains(&key.as_str()) || !is_blank(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn drops_blank_scalars() {
        let input = as_map(json!({
            "title": "Tarta",
            "description": "",
            "image": null,
            "notes": "   ",
            "servings": 4,
        }));

        let cleaned = sanitize(&input, &[]);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned["title"], "Tarta");
        assert_eq!(cleaned["servings"], 4);
    }

    #[test]
    fn drops_empty_collections_unless_bulk() {
        let input = as_map(json!({
            "ingredients": [],
            "steps": [],
            "tags": [],
        }));

        let cleaned = sanitize(&input, &["ingredients", "steps"]);

        assert!(cleaned.contains_key("ingredients"));
        assert!(cleaned.contains_key("steps"));
        assert!(!cleaned.contains_key("tags"));
    }

    #[test]
    fn bulk_fields_pass_through_unmodified() {
        let input = as_map(json!({
            "ingredients": [{ "name": "Harina", "quantity": "" }],
        }));

        let cleaned = sanitize(&input, &["ingredients"]);

        // Bulk entries are not cleaned recursively
        assert_eq!(cleaned["ingredients"], json!([{ "name": "Harina", "quantity": "" }]));
    }

    #[test]
    fn input_is_not_mutated() {
        let input = as_map(json!({ "a": "", "b": "x" }));
        let before = input.clone();
        let _ = sanitize(&input, &[]);
        assert_eq!(input, before);
    }

    #[test]
    fn zero_and_false_are_not_blank() {
        let input = as_map(json!({ "count": 0, "flag": false }));
        let cleaned = sanitize(&input, &[]);
        assert_eq!(cleaned.len(), 2);
    }
}
