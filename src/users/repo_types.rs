use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: Uuid,           // primary key, never changes
    pub name: String,
    pub surname: String,
    pub email: String,           // unique across active and inactive rows
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 hash, not exposed in JSON
    pub is_active: bool,         // false after soft delete
}

/// Fields needed to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub hashed_password: String,
}

/// Partial update of a user. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.surname.is_none() && self.email.is_none()
    }
}
