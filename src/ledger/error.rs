//! Ledger error taxonomy
//!
//! Business failures are reported verbatim and never retried; transient
//! conflicts are retried by the coordinator and only escalate as
//! `RetriesExhausted`; storage faults propagate immediately.

use crate::domain::AmountError;
use crate::store::StoreError;

/// Error returned by the transfer engine and the invariant checker.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The request was malformed: same-account transfer, non-positive
    /// amount, or mismatched currencies. Rejected before any mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced account does not exist.
    #[error("account {account_id} not found")]
    AccountNotFound { account_id: i64 },

    /// Some other referenced record does not exist.
    #[error("record not found")]
    NotFound,

    /// The resulting source balance would be negative. The unit of work
    /// was rolled back and nothing was persisted.
    #[error(
        "insufficient funds on account {account_id}: balance {balance}, requested {requested}"
    )]
    InsufficientFunds {
        account_id: i64,
        balance: i64,
        requested: i64,
    },

    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    AlreadyExists,

    /// Storage-level contention; the coordinator retries these.
    #[error("transient storage conflict")]
    TransientConflict,

    /// Every attempt inside the retry budget hit a transient conflict.
    #[error("aborted after {attempts} conflicting attempts")]
    RetriesExhausted { attempts: u32 },

    /// Any other storage failure. Never retried.
    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl LedgerError {
    /// Whether the coordinator should re-run the unit of work.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::TransientConflict)
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => LedgerError::NotFound,
            StoreError::AlreadyExists => LedgerError::AlreadyExists,
            StoreError::TransientConflict => LedgerError::TransientConflict,
            StoreError::Storage(inner) => LedgerError::Storage(inner),
        }
    }
}

// Driver errors from begin/commit go through the store taxonomy so a
// conflicting commit is classified as transient like any other conflict.
impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::from(err).into()
    }
}

impl From<AmountError> for LedgerError {
    fn from(err: AmountError) -> Self {
        LedgerError::InvalidArgument(err.to_string())
    }
}
