//! Ledger core
//!
//! The transactional transfer engine, the retry coordinator around it,
//! and the balance invariant checker.

mod engine;
mod error;
mod reconcile;
mod retry;

pub use engine::{LedgerEngine, TransferParams, TransferResult, DEFAULT_MAX_ATTEMPTS};
pub use error::LedgerError;
pub use reconcile::{reconcile_account, reconcile_all, Reconciliation};
pub use retry::run_with_retry;
