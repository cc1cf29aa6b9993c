use lazy_static::lazy_static;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::users::repo::UserStore;
use crate::users::repo_types::User;

lazy_static! {
    /// Verified against when the email is unknown, so both failure paths pay
    /// the same Argon2 cost.
    static ref DUMMY_HASH: Option<String> = hash_password("unknown-user-placeholder").ok();
}

/// Looks the user up by email and checks the password.
///
/// An unknown email and a wrong password both yield `Ok(None)`. Only store
/// failures come back as errors.
pub async fn authenticate(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let Some(user) = store.get_by_email(email).await? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify_password(password, dummy);
        }
        warn!("login unknown email");
        return Ok(None);
    };

    let ok = verify_password(password, &user.hashed_password).unwrap_or_else(|e| {
        warn!(error = %e, user_id = %user.user_id, "stored hash unreadable");
        false
    });
    if !ok {
        warn!(user_id = %user.user_id, "login invalid password");
        return Ok(None);
    }

    info!(user_id = %user.user_id, "user authenticated");
    Ok(Some(user))
}
