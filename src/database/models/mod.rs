pub mod category;
pub mod recipe;
pub mod user;

pub use category::Category;
pub use recipe::{AuthorSummary, CategorySummary, Difficulty, Ingredient, Recipe, Step};
pub use user::User;
