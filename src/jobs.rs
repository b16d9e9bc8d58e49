//! Scheduled jobs
//!
//! Background maintenance for the ledger. Currently one job: a periodic
//! reconciliation sweep that recomputes every account's entry sum and
//! logs any account whose stored balance has drifted.

use std::time::Duration;

use sqlx::PgPool;
use tokio::time::interval;

use crate::ledger::{reconcile_all, LedgerError, Reconciliation};

/// Outcome of one reconciliation sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub accounts_checked: usize,
    pub discrepancies: Vec<Reconciliation>,
}

impl SweepReport {
    /// Whether every checked account reconciled.
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Sweep all accounts once, logging each discrepancy.
pub async fn run_reconciliation_sweep(pool: &PgPool) -> Result<SweepReport, LedgerError> {
    let results = reconcile_all(pool).await?;
    let accounts_checked = results.len();

    let discrepancies: Vec<Reconciliation> =
        results.into_iter().filter(|r| !r.is_balanced()).collect();

    for check in &discrepancies {
        tracing::error!(
            account_id = check.account_id,
            balance = check.balance,
            entry_sum = check.entry_sum,
            discrepancy = check.discrepancy(),
            "account balance does not reconcile with its entries"
        );
    }

    if discrepancies.is_empty() {
        tracing::debug!(accounts_checked, "reconciliation sweep clean");
    }

    Ok(SweepReport {
        accounts_checked,
        discrepancies,
    })
}

/// Periodic reconciliation sweep over all accounts.
pub struct ReconciliationJob {
    pool: PgPool,
    period: Duration,
}

impl ReconciliationJob {
    pub fn new(pool: PgPool, period: Duration) -> Self {
        Self { pool, period }
    }

    /// Start the sweep loop in the background. Abort the returned handle
    /// to stop it.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(period_secs = self.period.as_secs(), "reconciliation job started");
            let mut ticker = interval(self.period);
            loop {
                ticker.tick().await;
                if let Err(e) = run_reconciliation_sweep(&self.pool).await {
                    tracing::error!(error = %e, "reconciliation sweep failed");
                }
            }
        })
    }
}
