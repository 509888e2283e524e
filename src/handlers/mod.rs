pub mod auth;
pub mod categories;
pub mod recipes;
pub mod users;
