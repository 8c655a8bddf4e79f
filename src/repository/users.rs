//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, ProfileChanges, User, UserCredential},
    services::users::USERNAME_TAKEN,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, user_id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, first_name, last_name, email, dob, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }

    /// Get the username and stored password hash for a login attempt
    pub async fn get_credential_by_username(&self, username: &str) -> AppResult<Option<UserCredential>> {
        let credential = sqlx::query_as::<_, UserCredential>(
            r#"
            SELECT u.user_id, u.username, uc.password
            FROM user_credentials uc
            JOIN users u ON uc.user_id = u.user_id
            WHERE u.username = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    /// Get the stored password hash of a user
    pub async fn get_password_hash(&self, user_id: i32) -> AppResult<String> {
        sqlx::query_scalar::<_, String>("SELECT password FROM user_credentials WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Credentials for user {} not found", user_id)))
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a user and its credentials in one transaction
    pub async fn create(&self, user: &NewUser, password_hash: &str) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, first_name, last_name, email, dob, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, username, first_name, last_name, email, dob, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.dob)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(USERNAME_TAKEN.to_string())
            }
            e => AppError::Database(e),
        })?;

        sqlx::query("INSERT INTO user_credentials (user_id, password) VALUES ($1, $2)")
            .bind(created.user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    /// Write the changed profile columns
    pub async fn update_profile(&self, user_id: i32, changes: &ProfileChanges) -> AppResult<User> {
        let columns = changes.columns();
        if columns.is_empty() {
            return self.get_by_id(user_id).await;
        }

        let query = format!(
            r#"
            UPDATE users SET {}
            WHERE user_id = ${}
            RETURNING user_id, username, first_name, last_name, email, dob, created_at
            "#,
            changes.set_clause(),
            columns.len() + 1
        );

        let mut builder = sqlx::query_as::<_, User>(&query);
        for (_, value) in &columns {
            builder = builder.bind(*value);
        }

        builder
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, user_id: i32, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE user_credentials SET password = $1, updated_at = $2 WHERE user_id = $3",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Credentials for user {} not found",
                user_id
            )));
        }
        Ok(())
    }
}
