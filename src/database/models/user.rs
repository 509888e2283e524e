use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Role;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub lastname: String,
    pub email: String,
    /// bcrypt hash; never serialized into a response
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub cel: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub photo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
