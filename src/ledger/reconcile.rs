//! Balance invariant checker
//!
//! Recomputes the entry sum for an account and compares it with the
//! stored balance. A detector, not a repair tool: callers decide what to
//! do with a discrepancy.

use serde::Serialize;
use sqlx::PgExecutor;

use super::LedgerError;

/// Outcome of checking one account against its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub account_id: i64,
    pub balance: i64,
    pub entry_sum: i64,
}

impl Reconciliation {
    /// Whether the stored balance matches the entry sum.
    pub fn is_balanced(&self) -> bool {
        self.balance == self.entry_sum
    }

    /// Stored balance minus entry sum; zero when balanced.
    pub fn discrepancy(&self) -> i64 {
        self.balance - self.entry_sum
    }
}

/// Check one account. A single query, so it reads a consistent snapshot
/// of balance and entries and can run inside a caller's transaction.
pub async fn reconcile_account<'e>(
    db: impl PgExecutor<'e>,
    account_id: i64,
) -> Result<Reconciliation, LedgerError> {
    let row: Option<(i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT a.id, a.balance, COALESCE(SUM(e.amount), 0)::bigint AS entry_sum
        FROM accounts a
        LEFT JOIN entries e ON e.account_id = a.id
        WHERE a.id = $1
        GROUP BY a.id, a.balance
        "#,
    )
    .bind(account_id)
    .fetch_optional(db)
    .await
    .map_err(crate::store::StoreError::from)?;

    let (account_id, balance, entry_sum) =
        row.ok_or(LedgerError::AccountNotFound { account_id })?;

    Ok(Reconciliation {
        account_id,
        balance,
        entry_sum,
    })
}

/// Check every account. Used by the periodic sweep and by tests.
pub async fn reconcile_all<'e>(
    db: impl PgExecutor<'e>,
) -> Result<Vec<Reconciliation>, LedgerError> {
    let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT a.id, a.balance, COALESCE(SUM(e.amount), 0)::bigint AS entry_sum
        FROM accounts a
        LEFT JOIN entries e ON e.account_id = a.id
        GROUP BY a.id, a.balance
        ORDER BY a.id
        "#,
    )
    .fetch_all(db)
    .await
    .map_err(crate::store::StoreError::from)?;

    Ok(rows
        .into_iter()
        .map(|(account_id, balance, entry_sum)| Reconciliation {
            account_id,
            balance,
            entry_sum,
        })
        .collect())
}
