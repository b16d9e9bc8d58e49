//! Entry records
//!
//! The append-only audit trail. Each committed transfer writes two rows
//! here, one debit and one credit. Entries are never rewritten outside the
//! explicit correction operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::StoreError;

/// A stored ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    /// Positive for credits, negative for debits.
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Insert a new entry row.
pub async fn create<'e>(
    db: impl PgExecutor<'e>,
    account_id: i64,
    amount: i64,
) -> Result<Entry, StoreError> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entries (account_id, amount)
        VALUES ($1, $2)
        RETURNING id, account_id, amount, created_at
        "#,
    )
    .bind(account_id)
    .bind(amount)
    .fetch_one(db)
    .await?;

    Ok(entry)
}

/// Fetch an entry by id.
pub async fn get<'e>(db: impl PgExecutor<'e>, id: i64) -> Result<Entry, StoreError> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        SELECT id, account_id, amount, created_at
        FROM entries
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    entry.ok_or(StoreError::NotFound)
}

/// Correct an entry's amount. This is an explicit correction operation;
/// normal flow never mutates an entry after it is written.
pub async fn update<'e>(
    db: impl PgExecutor<'e>,
    id: i64,
    amount: i64,
) -> Result<Entry, StoreError> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        UPDATE entries
        SET amount = $2
        WHERE id = $1
        RETURNING id, account_id, amount, created_at
        "#,
    )
    .bind(id)
    .bind(amount)
    .fetch_optional(db)
    .await?;

    entry.ok_or(StoreError::NotFound)
}

/// Delete an entry by id.
pub async fn delete<'e>(db: impl PgExecutor<'e>, id: i64) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM entries WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// List entries across all accounts, ordered by id.
pub async fn list<'e>(
    db: impl PgExecutor<'e>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Entry>, StoreError> {
    let entries = sqlx::query_as::<_, Entry>(
        r#"
        SELECT id, account_id, amount, created_at
        FROM entries
        ORDER BY id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(entries)
}

/// List the entries of one account, ordered by id.
pub async fn list_for_account<'e>(
    db: impl PgExecutor<'e>,
    account_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Entry>, StoreError> {
    let entries = sqlx::query_as::<_, Entry>(
        r#"
        SELECT id, account_id, amount, created_at
        FROM entries
        WHERE account_id = $1
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(account_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(entries)
}

/// Sum of all entry amounts for one account. The cast keeps the result in
/// `i64`; Postgres widens `SUM(bigint)` to numeric otherwise.
pub async fn sum_for_account<'e>(
    db: impl PgExecutor<'e>,
    account_id: i64,
) -> Result<i64, StoreError> {
    let sum: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount), 0)::bigint
        FROM entries
        WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .fetch_one(db)
    .await?;

    Ok(sum)
}
