//! Account records
//!
//! Plain row operations plus the atomic balance-delta update the transfer
//! engine depends on. Every function takes an executor, so it runs either
//! against the pool or inside a caller-scoped transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::StoreError;

/// A stored account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    /// Balance in the smallest currency unit. Never negative after a
    /// committed transfer.
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

/// Insert a new account row.
pub async fn create<'e>(
    db: impl PgExecutor<'e>,
    params: &CreateAccountParams,
) -> Result<Account, StoreError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (owner, balance, currency)
        VALUES ($1, $2, $3)
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(&params.owner)
    .bind(params.balance)
    .bind(&params.currency)
    .fetch_one(db)
    .await?;

    Ok(account)
}

/// Fetch an account by id.
pub async fn get<'e>(db: impl PgExecutor<'e>, id: i64) -> Result<Account, StoreError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, owner, balance, currency, created_at
        FROM accounts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    account.ok_or(StoreError::NotFound)
}

/// Overwrite an account's balance. This is the plain CRUD path; the
/// transfer engine uses [`add_balance`] instead.
pub async fn set_balance<'e>(
    db: impl PgExecutor<'e>,
    id: i64,
    balance: i64,
) -> Result<Account, StoreError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET balance = $2
        WHERE id = $1
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(id)
    .bind(balance)
    .fetch_optional(db)
    .await?;

    account.ok_or(StoreError::NotFound)
}

/// Atomically add a signed delta to an account's balance and return the
/// updated row. The increment happens in the database, so concurrent
/// deltas against the same row serialize on its lock instead of racing
/// through a read-then-write cycle.
pub async fn add_balance<'e>(
    db: impl PgExecutor<'e>,
    id: i64,
    delta: i64,
) -> Result<Account, StoreError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET balance = balance + $2
        WHERE id = $1
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(id)
    .bind(delta)
    .fetch_optional(db)
    .await?;

    account.ok_or(StoreError::NotFound)
}

/// Delete an account by id.
pub async fn delete<'e>(db: impl PgExecutor<'e>, id: i64) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// List accounts ordered by id.
pub async fn list<'e>(
    db: impl PgExecutor<'e>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Account>, StoreError> {
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, owner, balance, currency, created_at
        FROM accounts
        ORDER BY id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(accounts)
}
