use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::users::repo_types::{NewUser, User, UserUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user with this email already exists")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

/// Name of the unique constraint on `users.email`, see the migrations.
pub const EMAIL_CONSTRAINT: &str = "users_email_key";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(EMAIL_CONSTRAINT) =>
            {
                StoreError::DuplicateEmail
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Storage of user records.
///
/// Absence is reported as `None`, never as an error. `update_fields` and
/// `soft_delete` only touch active rows, so a missing row and an inactive
/// row look the same to the caller.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Reads are not filtered by `is_active`.
    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Returns the id when an active row was updated.
    async fn update_fields(
        &self,
        user_id: Uuid,
        update: UserUpdate,
    ) -> Result<Option<Uuid>, StoreError>;

    /// Returns the id when an active row was switched to inactive.
    async fn soft_delete(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, surname, email, hashed_password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING user_id, name, surname, email, hashed_password, is_active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        debug!(user_id = %created.user_id, "user row inserted");
        Ok(created)
    }

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, surname, email, hashed_password, is_active
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, surname, email, hashed_password, is_active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn update_fields(
        &self,
        user_id: Uuid,
        update: UserUpdate,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Active check and write happen in one statement.
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE users
            SET name    = COALESCE($2, name),
                surname = COALESCE($3, surname),
                email   = COALESCE($4, email)
            WHERE user_id = $1 AND is_active
            RETURNING user_id
            "#,
        )
        .bind(user_id)
        .bind(update.name)
        .bind(update.surname)
        .bind(update.email)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn soft_delete(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE users
            SET is_active = FALSE
            WHERE user_id = $1 AND is_active
            RETURNING user_id
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(deleted)
    }
}
