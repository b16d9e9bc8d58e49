//! Transfer records
//!
//! One row per requested money movement. The paired debit and credit
//! entries are written in the same unit of work by the transfer engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::StoreError;

/// A stored transfer row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Always positive; direction is carried by the account columns.
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a transfer row.
#[derive(Debug, Clone, Copy)]
pub struct CreateTransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Insert a new transfer row.
pub async fn create<'e>(
    db: impl PgExecutor<'e>,
    params: &CreateTransferParams,
) -> Result<Transfer, StoreError> {
    let transfer = sqlx::query_as::<_, Transfer>(
        r#"
        INSERT INTO transfers (from_account_id, to_account_id, amount)
        VALUES ($1, $2, $3)
        RETURNING id, from_account_id, to_account_id, amount, created_at
        "#,
    )
    .bind(params.from_account_id)
    .bind(params.to_account_id)
    .bind(params.amount)
    .fetch_one(db)
    .await?;

    Ok(transfer)
}

/// Fetch a transfer by id.
pub async fn get<'e>(db: impl PgExecutor<'e>, id: i64) -> Result<Transfer, StoreError> {
    let transfer = sqlx::query_as::<_, Transfer>(
        r#"
        SELECT id, from_account_id, to_account_id, amount, created_at
        FROM transfers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    transfer.ok_or(StoreError::NotFound)
}

/// Delete a transfer by id.
pub async fn delete<'e>(db: impl PgExecutor<'e>, id: i64) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM transfers WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// List transfers ordered by id.
pub async fn list<'e>(
    db: impl PgExecutor<'e>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Transfer>, StoreError> {
    let transfers = sqlx::query_as::<_, Transfer>(
        r#"
        SELECT id, from_account_id, to_account_id, amount, created_at
        FROM transfers
        ORDER BY id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(transfers)
}

/// List transfers that touch one account, in either direction.
pub async fn list_for_account<'e>(
    db: impl PgExecutor<'e>,
    account_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Transfer>, StoreError> {
    let transfers = sqlx::query_as::<_, Transfer>(
        r#"
        SELECT id, from_account_id, to_account_id, amount, created_at
        FROM transfers
        WHERE from_account_id = $1 OR to_account_id = $1
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(account_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(transfers)
}
