//! User records
//!
//! Account owners. Usernames are the primary key and email addresses are
//! unique; both surface as `AlreadyExists` on conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::StoreError;

/// A stored user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
}

/// Insert a new user row.
pub async fn create<'e>(
    db: impl PgExecutor<'e>,
    params: &CreateUserParams,
) -> Result<User, StoreError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, hashed_password, full_name, email)
        VALUES ($1, $2, $3, $4)
        RETURNING username, hashed_password, full_name, email, password_changed_at, created_at
        "#,
    )
    .bind(&params.username)
    .bind(&params.hashed_password)
    .bind(&params.full_name)
    .bind(&params.email)
    .fetch_one(db)
    .await?;

    Ok(user)
}

/// Fetch a user by username.
pub async fn get<'e>(db: impl PgExecutor<'e>, username: &str) -> Result<User, StoreError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT username, hashed_password, full_name, email, password_changed_at, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    user.ok_or(StoreError::NotFound)
}
