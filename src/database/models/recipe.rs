use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recipe aggregate as returned by the API: scalar fields plus resolved
/// author/category summaries and both child collections.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub image: Option<String>,
    pub author: AuthorSummary,
    pub category: CategorySummary,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub lastname: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
}

/// Child of a recipe; its natural key is (recipe, name).
#[derive(Debug, Clone, Serialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

/// Child of a recipe; its natural key is (recipe, order).
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub order: i32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Low => "low",
            Difficulty::Medium => "medium",
            Difficulty::High => "high",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Difficulty::Low),
            "medium" => Ok(Difficulty::Medium),
            "high" => Ok(Difficulty::High),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}
