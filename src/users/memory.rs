use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::users::repo::{StoreError, UserStore};
use crate::users::repo_types::{NewUser, User, UserUpdate};

/// In-process `UserStore` with the same uniqueness and activity rules as the
/// `users` table. Each call holds the lock for its whole duration.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<HashMap<Uuid, User>>,
}

fn email_taken(rows: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    rows.values()
        .any(|u| u.email == email && Some(u.user_id) != except)
}

fn apply(update: UserUpdate, user: &mut User) {
    if let Some(name) = update.name {
        user.name = name;
    }
    if let Some(surname) = update.surname {
        user.surname = surname;
    }
    if let Some(email) = update.email {
        user.email = email;
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().await;
        if email_taken(&rows, &user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        let created = User {
            user_id: Uuid::new_v4(),
            name: user.name,
            surname: user.surname,
            email: user.email,
            hashed_password: user.hashed_password,
            is_active: true,
        };
        rows.insert(created.user_id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.rows.lock().await.get(&user_id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_fields(
        &self,
        user_id: Uuid,
        update: UserUpdate,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut rows = self.rows.lock().await;
        if !rows.get(&user_id).is_some_and(|u| u.is_active) {
            return Ok(None);
        }
        if let Some(email) = &update.email {
            if email_taken(&rows, email, Some(user_id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }
        match rows.get_mut(&user_id) {
            Some(user) => {
                apply(update, user);
                Ok(Some(user_id))
            }
            None => Ok(None),
        }
    }

    async fn soft_delete(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&user_id) {
            Some(user) if user.is_active => {
                user.is_active = false;
                Ok(Some(user_id))
            }
            _ => Ok(None),
        }
    }
}
