use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::users::dto::{ShowUser, UserCreate};
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, UserUpdate};

pub async fn create_user(store: &dyn UserStore, body: UserCreate) -> Result<ShowUser, AppError> {
    let hashed_password = hash_password(&body.password)?;
    let user = store
        .create(NewUser {
            name: body.name,
            surname: body.surname,
            email: body.email,
            hashed_password,
        })
        .await?;
    info!(user_id = %user.user_id, "user created");
    Ok(user.into())
}

pub async fn get_user(store: &dyn UserStore, user_id: Uuid) -> Result<ShowUser, AppError> {
    store
        .get_by_id(user_id)
        .await?
        .map(ShowUser::from)
        .ok_or_else(|| AppError::NotFound(format!("User with id {user_id} not found")))
}

/// Missing and already deleted users both come back as `NotFound`.
pub async fn delete_user(store: &dyn UserStore, user_id: Uuid) -> Result<Uuid, AppError> {
    let deleted = store
        .soft_delete(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {user_id} not found")))?;
    info!(user_id = %deleted, "user deactivated");
    Ok(deleted)
}

pub async fn update_user(
    store: &dyn UserStore,
    user_id: Uuid,
    update: UserUpdate,
) -> Result<Uuid, AppError> {
    let updated = store
        .update_fields(user_id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {user_id} not found")))?;
    info!(user_id = %updated, "user updated");
    Ok(updated)
}
