use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::models::Difficulty;
use crate::validation::{rules, FieldErrors, FromPayload, ObjectShape};

/// Payload of `POST /api/recipes`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeCreate {
    pub title: String,
    pub description: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub image: Option<String>,
    pub category_id: Uuid,
    pub ingredients: Vec<IngredientInput>,
    pub steps: Vec<StepInput>,
}

/// Payload of `PATCH /api/recipes/:id`: everything optional, children
/// reconciled against persisted state by natural key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    pub ingredients: Option<Vec<IngredientInput>>,
    pub steps: Option<Vec<StepInput>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientInput {
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepInput {
    pub order: i32,
    pub description: String,
}

fn difficulty(value: &Value) -> Result<Difficulty, String> {
    rules::string(value)?
        .parse()
        .map_err(|_| "Must be one of low, medium or high".to_string())
}

fn ingredient_item(shape: &mut ObjectShape<'_>) -> Option<IngredientInput> {
    let name = shape.required("name", rules::non_empty);
    let quantity = shape.optional("quantity", rules::lowercase);
    let unit = shape.optional("unit", rules::lowercase);

    Some(IngredientInput {
        name: name?,
        quantity,
        unit,
    })
}

fn step_item(shape: &mut ObjectShape<'_>) -> Option<StepInput> {
    let order = shape.required("order", rules::positive_int);
    let description = shape.required("description", rules::non_empty);

    Some(StepInput {
        order: order?,
        description: description?,
    })
}

impl FromPayload for RecipeCreate {
    const BULK_FIELDS: &'static [&'static str] = &["ingredients", "steps"];

    fn from_payload(input: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut shape = ObjectShape::new(input);

        let title = shape.required("title", rules::non_empty);
        let description = shape.optional("description", rules::string);
        let prep_time = shape.optional("prepTime", rules::positive_int);
        let cook_time = shape.optional("cookTime", rules::positive_int);
        let servings = shape.optional("servings", rules::positive_int);
        let difficulty = shape.optional("difficulty", difficulty);
        let image = shape.optional("image", rules::string);
        let category_id = shape.required("categoryId", rules::uuid);
        let ingredients = shape.required_array(
            "ingredients",
            1,
            "There must be at least one ingredient",
            ingredient_item,
        );
        let steps = shape.required_array("steps", 1, "There must be at least one step", step_item);

        match (title, category_id, ingredients, steps) {
            (Some(title), Some(category_id), Some(ingredients), Some(steps)) => {
                shape.finish()?;
                Ok(Self {
                    title,
                    description,
                    prep_time,
                    cook_time,
                    servings,
                    difficulty,
                    image,
                    category_id,
                    ingredients,
                    steps,
                })
            }
            _ => Err(shape.into_errors()),
        }
    }
}

impl FromPayload for RecipeUpdate {
    const BULK_FIELDS: &'static [&'static str] = &["ingredients", "steps"];

    fn from_payload(input: &Map<String, Value>) -> Result<Self, FieldErrors> {
        let mut shape = ObjectShape::new(input);

        let title = shape.optional("title", rules::non_empty);
        let description = shape.optional("description", rules::string);
        let prep_time = shape.optional("prepTime", rules::positive_int);
        let cook_time = shape.optional("cookTime", rules::positive_int);
        let servings = shape.optional("servings", rules::positive_int);
        let difficulty = shape.optional("difficulty", difficulty);
        let image = shape.optional("image", rules::string);
        let category_id = shape.optional("categoryId", rules::uuid);
        let ingredients = shape.optional_array("ingredients", ingredient_item);
        let steps = shape.optional_array("steps", step_item);

        shape.finish()?;
        Ok(Self {
            title,
            description,
            prep_time,
            cook_time,
            servings,
            difficulty,
            image,
            category_id,
            ingredients,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_create() -> Value {
        json!({
            "title": "Tarta",
            "categoryId": Uuid::new_v4().to_string(),
            "ingredients": [
                { "name": "Harina", "quantity": "2", "unit": "Tazas" }
            ],
            "steps": [
                { "order": 1, "description": "Mezclar" }
            ]
        })
    }

    #[test]
    fn create_normalizes_quantity_and_unit_to_lowercase() {
        let raw = valid_create();
        let parsed = RecipeCreate::from_payload(raw.as_object().unwrap()).unwrap();

        assert_eq!(parsed.title, "Tarta");
        assert_eq!(parsed.ingredients[0].quantity.as_deref(), Some("2"));
        assert_eq!(parsed.ingredients[0].unit.as_deref(), Some("tazas"));
        assert_eq!(parsed.steps[0].order, 1);
    }

    #[test]
    fn create_requires_at_least_one_ingredient_and_step() {
        let mut raw = valid_create();
        raw["ingredients"] = json!([]);
        raw["steps"] = json!([]);

        let errors = RecipeCreate::from_payload(raw.as_object().unwrap()).unwrap_err();
        assert_eq!(
            errors["ingredients"],
            vec!["There must be at least one ingredient".to_string()]
        );
        assert_eq!(errors["steps"], vec!["There must be at least one step".to_string()]);
    }

    #[test]
    fn create_rejects_bad_children_with_indexed_paths() {
        let mut raw = valid_create();
        raw["ingredients"] = json!([{ "quantity": "2" }]);
        raw["steps"] = json!([{ "order": 0, "description": "Mezclar" }]);

        let errors = RecipeCreate::from_payload(raw.as_object().unwrap()).unwrap_err();
        assert_eq!(errors["ingredients.0.name"], vec!["Required".to_string()]);
        assert_eq!(
            errors["steps.0.order"],
            vec!["Must be a positive integer".to_string()]
        );
    }

    #[test]
    fn create_rejects_unknown_difficulty() {
        let mut raw = valid_create();
        raw["difficulty"] = json!("impossible");

        let errors = RecipeCreate::from_payload(raw.as_object().unwrap()).unwrap_err();
        assert_eq!(
            errors["difficulty"],
            vec!["Must be one of low, medium or high".to_string()]
        );
    }

    #[test]
    fn update_accepts_an_empty_payload() {
        let raw = json!({});
        let parsed = RecipeUpdate::from_payload(raw.as_object().unwrap()).unwrap();
        assert_eq!(parsed, RecipeUpdate::default());
    }

    #[test]
    fn update_allows_children_without_minimums() {
        let raw = json!({
            "ingredients": [{ "name": "Harina", "quantity": "3", "unit": "tazas" }]
        });
        let parsed = RecipeUpdate::from_payload(raw.as_object().unwrap()).unwrap();

        let ingredients = parsed.ingredients.unwrap();
        assert_eq!(ingredients.len(), 1);
        assert_eq!(ingredients[0].quantity.as_deref(), Some("3"));
        assert!(parsed.steps.is_none());
    }
}
