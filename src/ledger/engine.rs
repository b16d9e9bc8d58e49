//! Transfer engine
//!
//! Moves funds between two accounts as one atomic unit of work: one
//! transfer row, two entry rows, two balance updates, or none of them.
//! Balance deltas are applied in ascending account-id order so concurrent
//! transfers over the same pair of accounts acquire row locks in the same
//! order and cannot form a lock cycle.

use serde::Serialize;

use crate::domain::Amount;
use crate::store::{accounts, entries, transfers};
use crate::store::{Account, CreateTransferParams, Entry, Store, StoreError, Transfer};

use super::retry::run_with_retry;
use super::LedgerError;

/// Default retry budget for transient conflicts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A request to move `amount` from one account to another.
#[derive(Debug, Clone, Copy)]
pub struct TransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Amount in the smallest currency unit. Must be positive.
    pub amount: i64,
}

/// Everything a committed transfer produced, including both post-transfer
/// account states.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

/// The transactional transfer engine.
///
/// Holds no in-process locks; all blocking happens at the storage
/// boundary. The engine's futures are cancel-safe: dropping an in-flight
/// transfer rolls the store transaction back and leaves no partial state,
/// so callers may wrap invocations in `tokio::time::timeout`.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    store: Store,
    max_attempts: u32,
}

impl LedgerEngine {
    /// Create an engine with the default retry budget.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the retry budget for transient conflicts.
    pub fn with_max_attempts(store: Store, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts,
        }
    }

    /// Execute a transfer, retrying transient conflicts.
    ///
    /// Business failures (`InvalidArgument`, `AccountNotFound`,
    /// `InsufficientFunds`) are returned verbatim without retry.
    pub async fn transfer(&self, params: TransferParams) -> Result<TransferResult, LedgerError> {
        if params.from_account_id == params.to_account_id {
            return Err(LedgerError::InvalidArgument(format!(
                "cannot transfer from account {} to itself",
                params.from_account_id
            )));
        }
        let amount = Amount::new(params.amount)?;

        run_with_retry(self.max_attempts, || {
            self.attempt(params.from_account_id, params.to_account_id, amount)
        })
        .await
    }

    /// One attempt of the unit of work. Called afresh on every retry.
    async fn attempt(
        &self,
        from_account_id: i64,
        to_account_id: i64,
        amount: Amount,
    ) -> Result<TransferResult, LedgerError> {
        let mut tx = self.store.begin().await?;

        // Preconditions, before any mutation. Dropping the transaction on
        // an early return rolls it back.
        let from_account = accounts::get(&mut *tx, from_account_id)
            .await
            .map_err(|e| account_err(e, from_account_id))?;
        let to_account = accounts::get(&mut *tx, to_account_id)
            .await
            .map_err(|e| account_err(e, to_account_id))?;

        if from_account.currency != to_account.currency {
            return Err(LedgerError::InvalidArgument(format!(
                "currency mismatch: account {} holds {}, account {} holds {}",
                from_account.id, from_account.currency, to_account.id, to_account.currency
            )));
        }

        let transfer = transfers::create(
            &mut *tx,
            &CreateTransferParams {
                from_account_id,
                to_account_id,
                amount: amount.get(),
            },
        )
        .await?;

        let from_entry = entries::create(&mut *tx, from_account_id, -amount.get()).await?;
        let to_entry = entries::create(&mut *tx, to_account_id, amount.get()).await?;

        // Lower account id first, regardless of direction.
        let (from_account, to_account) = if from_account_id < to_account_id {
            let from = accounts::add_balance(&mut *tx, from_account_id, -amount.get()).await?;
            let to = accounts::add_balance(&mut *tx, to_account_id, amount.get()).await?;
            (from, to)
        } else {
            let to = accounts::add_balance(&mut *tx, to_account_id, amount.get()).await?;
            let from = accounts::add_balance(&mut *tx, from_account_id, -amount.get()).await?;
            (from, to)
        };

        if from_account.balance < 0 {
            tx.rollback().await?;
            return Err(LedgerError::InsufficientFunds {
                account_id: from_account_id,
                balance: from_account.balance + amount.get(),
                requested: amount.get(),
            });
        }

        tx.commit().await?;

        tracing::debug!(
            transfer_id = transfer.id,
            from_account_id,
            to_account_id,
            amount = amount.get(),
            "transfer committed"
        );

        Ok(TransferResult {
            transfer,
            from_account,
            to_account,
            from_entry,
            to_entry,
        })
    }
}

fn account_err(err: StoreError, account_id: i64) -> LedgerError {
    match err {
        StoreError::NotFound => LedgerError::AccountNotFound { account_id },
        other => other.into(),
    }
}
