//! Record store
//!
//! Durable Postgres storage for users, accounts, entries, and transfers.
//! Entity modules expose executor-generic row operations so the transfer
//! engine can run them inside its own transaction; the [`Store`] facade
//! owns the pool and offers the pool-bound convenience surface plus the
//! unit-of-work primitive.

pub mod accounts;
pub mod entries;
mod error;
pub mod transfers;
pub mod users;

use sqlx::{PgPool, Postgres, Transaction};

pub use accounts::{Account, CreateAccountParams};
pub use entries::Entry;
pub use error::StoreError;
pub use transfers::{CreateTransferParams, Transfer};
pub use users::{CreateUserParams, User};

/// Transaction isolation for an externally-scoped unit of work.
///
/// The transfer engine runs at READ COMMITTED and relies on atomic balance
/// deltas plus row locks; stricter levels are available for callers that
/// need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    fn set_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            IsolationLevel::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            IsolationLevel::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

/// Pool-owning facade over the entity modules.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Create a new store over a database pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for callers composing their own queries.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a unit of work at the default isolation level.
    ///
    /// Dropping the returned transaction without committing rolls it back,
    /// so an abandoned unit of work leaves no partial state.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        Ok(self.pool.begin().await?)
    }

    /// Begin a unit of work at an explicit isolation level.
    pub async fn begin_with(
        &self,
        level: IsolationLevel,
    ) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(level.set_sql()).execute(&mut *tx).await?;
        Ok(tx)
    }

    // Accounts

    pub async fn create_account(&self, params: &CreateAccountParams) -> Result<Account, StoreError> {
        accounts::create(&self.pool, params).await
    }

    pub async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        accounts::get(&self.pool, id).await
    }

    pub async fn set_account_balance(&self, id: i64, balance: i64) -> Result<Account, StoreError> {
        accounts::set_balance(&self.pool, id, balance).await
    }

    pub async fn add_account_balance(&self, id: i64, delta: i64) -> Result<Account, StoreError> {
        accounts::add_balance(&self.pool, id, delta).await
    }

    pub async fn delete_account(&self, id: i64) -> Result<(), StoreError> {
        accounts::delete(&self.pool, id).await
    }

    pub async fn list_accounts(&self, limit: i64, offset: i64) -> Result<Vec<Account>, StoreError> {
        accounts::list(&self.pool, limit, offset).await
    }

    // Entries

    pub async fn create_entry(&self, account_id: i64, amount: i64) -> Result<Entry, StoreError> {
        entries::create(&self.pool, account_id, amount).await
    }

    pub async fn get_entry(&self, id: i64) -> Result<Entry, StoreError> {
        entries::get(&self.pool, id).await
    }

    pub async fn update_entry(&self, id: i64, amount: i64) -> Result<Entry, StoreError> {
        entries::update(&self.pool, id, amount).await
    }

    pub async fn delete_entry(&self, id: i64) -> Result<(), StoreError> {
        entries::delete(&self.pool, id).await
    }

    pub async fn list_entries(&self, limit: i64, offset: i64) -> Result<Vec<Entry>, StoreError> {
        entries::list(&self.pool, limit, offset).await
    }

    pub async fn list_account_entries(
        &self,
        account_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Entry>, StoreError> {
        entries::list_for_account(&self.pool, account_id, limit, offset).await
    }

    pub async fn sum_account_entries(&self, account_id: i64) -> Result<i64, StoreError> {
        entries::sum_for_account(&self.pool, account_id).await
    }

    // Transfers

    pub async fn create_transfer(
        &self,
        params: &CreateTransferParams,
    ) -> Result<Transfer, StoreError> {
        transfers::create(&self.pool, params).await
    }

    pub async fn get_transfer(&self, id: i64) -> Result<Transfer, StoreError> {
        transfers::get(&self.pool, id).await
    }

    pub async fn delete_transfer(&self, id: i64) -> Result<(), StoreError> {
        transfers::delete(&self.pool, id).await
    }

    pub async fn list_transfers(&self, limit: i64, offset: i64) -> Result<Vec<Transfer>, StoreError> {
        transfers::list(&self.pool, limit, offset).await
    }

    pub async fn list_account_transfers(
        &self,
        account_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, StoreError> {
        transfers::list_for_account(&self.pool, account_id, limit, offset).await
    }

    // Users

    pub async fn create_user(&self, params: &CreateUserParams) -> Result<User, StoreError> {
        users::create(&self.pool, params).await
    }

    pub async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        users::get(&self.pool, username).await
    }
}
