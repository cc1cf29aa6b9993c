use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::users::repo_types::{User, UserUpdate};

lazy_static! {
    static ref LETTERS_RE: Regex = Regex::new(r"^[а-яА-Яa-zA-Z\-]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub(crate) fn is_letters_only(value: &str) -> bool {
    LETTERS_RE.is_match(value)
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::Validation("value is not a valid email address".into()))
    }
}

/// Request body for `POST /user/`.
#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

impl UserCreate {
    pub fn validate(&mut self) -> Result<(), AppError> {
        if !is_letters_only(&self.name) {
            return Err(AppError::Validation("Name should contains only letters".into()));
        }
        if !is_letters_only(&self.surname) {
            return Err(AppError::Validation(
                "Surname should contains only letters".into(),
            ));
        }
        self.email = normalize_email(&self.email);
        check_email(&self.email)
    }
}

/// Request body for `PATCH /user/`. Absent and `null` fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserRequest {
    /// Validates the supplied fields and turns them into a store update.
    pub fn into_update(self) -> Result<UserUpdate, AppError> {
        if let Some(name) = &self.name {
            if !is_letters_only(name) {
                return Err(AppError::Validation(
                    "Name should contains only letters!".into(),
                ));
            }
        }
        if let Some(surname) = &self.surname {
            if !is_letters_only(surname) {
                return Err(AppError::Validation(
                    "Surname should contains only letters!".into(),
                ));
            }
        }
        let email = self.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            check_email(email)?;
        }

        let update = UserUpdate {
            name: self.name,
            surname: self.surname,
            email,
        };
        if update.is_empty() {
            return Err(AppError::Validation(
                "At least one parameter for user update info should be provided".into(),
            ));
        }
        Ok(update)
    }
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowUser {
    pub user_id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub is_active: bool,
}

impl From<User> for ShowUser {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            name: u.name,
            surname: u.surname,
            email: u.email,
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub deleted_user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub updated_user_id: Uuid,
}
