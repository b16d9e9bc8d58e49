//! API Routes
//!
//! HTTP endpoint definitions. Handlers stay thin: validate the request,
//! call into the store or the ledger engine, serialize the result.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::{Amount, Currency};
use crate::error::{AppError, AppResult};
use crate::ledger::{
    reconcile_account, LedgerEngine, Reconciliation, TransferParams, TransferResult,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::password::hash_password;
use crate::store::{
    Account, CreateAccountParams, CreateUserParams, Entry, Store, StoreError, Transfer,
};

/// Shared router state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Retry budget handed to the transfer engine.
    pub transfer_max_attempts: u32,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            transfer_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    fn store(&self) -> Store {
        Store::new(self.pool.clone())
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub owner: String,
    pub currency: Currency,
}

#[derive(Debug, Deserialize)]
pub struct AddBalanceRequest {
    /// Signed delta in the smallest currency unit.
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl ListQuery {
    fn validate(&self) -> Result<(), AppError> {
        if self.limit < 1 || self.limit > 100 {
            return Err(AppError::InvalidRequest(
                "limit must be between 1 and 100".to_string(),
            ));
        }
        if self.offset < 0 {
            return Err(AppError::InvalidRequest(
                "offset must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: Amount,
    /// Must match the currency of both accounts.
    pub currency: Currency,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

/// User representation returned by the API. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::store::User> for UserResponse {
    fn from(user: crate::store::User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}

// =========================================================================
// Router
// =========================================================================

/// Create the API router. Handlers construct the store and engine per
/// request from the shared state.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account).get(list_accounts))
        .route(
            "/accounts/:id",
            get(get_account).patch(add_account_balance).delete(delete_account),
        )
        .route("/accounts/:id/entries", get(list_account_entries))
        .route("/accounts/:id/reconciliation", get(get_reconciliation))
        .route("/transfers", post(create_transfer).get(list_transfers))
        .route("/transfers/:id", get(get_transfer))
        .route("/users", post(create_user))
        .route("/users/:username", get(get_user))
}

// =========================================================================
// Account handlers
// =========================================================================

async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> AppResult<Json<Account>> {
    let store = state.store();

    // Surface a missing owner as not-found instead of a raw foreign key
    // violation from the insert.
    store.get_user(&req.owner).await?;

    let account = store
        .create_account(&CreateAccountParams {
            owner: req.owner,
            balance: 0,
            currency: req.currency.code().to_string(),
        })
        .await?;

    Ok(Json(account))
}

async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Account>> {
    let account = state.store().get_account(id).await?;
    Ok(Json(account))
}

async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Account>>> {
    query.validate()?;
    let accounts = state.store().list_accounts(query.limit, query.offset).await?;
    Ok(Json(accounts))
}

async fn add_account_balance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AddBalanceRequest>,
) -> AppResult<Json<Account>> {
    let account = state.store().add_account_balance(id, req.amount).await?;
    Ok(Json(account))
}

async fn delete_account(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<()> {
    state.store().delete_account(id).await?;
    Ok(())
}

async fn list_account_entries(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Entry>>> {
    query.validate()?;
    let entries = state
        .store()
        .list_account_entries(id, query.limit, query.offset)
        .await?;
    Ok(Json(entries))
}

async fn get_reconciliation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reconciliation>> {
    let check = reconcile_account(&state.pool, id).await?;
    if !check.is_balanced() {
        tracing::warn!(
            account_id = check.account_id,
            discrepancy = check.discrepancy(),
            "reconciliation requested for drifted account"
        );
    }
    Ok(Json(check))
}

// =========================================================================
// Transfer handlers
// =========================================================================

async fn create_transfer(
    State(state): State<AppState>,
    Json(req): Json<CreateTransferRequest>,
) -> AppResult<Json<TransferResult>> {
    let store = state.store();

    // The request currency must match both accounts before the engine runs.
    valid_account(&store, req.from_account_id, req.currency).await?;
    valid_account(&store, req.to_account_id, req.currency).await?;

    let engine = LedgerEngine::with_max_attempts(store, state.transfer_max_attempts);
    let result = engine
        .transfer(TransferParams {
            from_account_id: req.from_account_id,
            to_account_id: req.to_account_id,
            amount: req.amount.get(),
        })
        .await?;

    Ok(Json(result))
}

async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Transfer>> {
    let transfer = state.store().get_transfer(id).await?;
    Ok(Json(transfer))
}

async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Transfer>>> {
    query.validate()?;
    let transfers = state.store().list_transfers(query.limit, query.offset).await?;
    Ok(Json(transfers))
}

/// Check that an account exists and holds the expected currency.
async fn valid_account(store: &Store, account_id: i64, currency: Currency) -> AppResult<Account> {
    let account = store.get_account(account_id).await.map_err(|e| match e {
        StoreError::NotFound => {
            AppError::Ledger(crate::ledger::LedgerError::AccountNotFound { account_id })
        }
        other => other.into(),
    })?;

    if account.currency != currency.code() {
        return Err(AppError::InvalidRequest(format!(
            "account {} currency mismatch: {} vs {}",
            account.id, account.currency, currency
        )));
    }

    Ok(account)
}

// =========================================================================
// User handlers
// =========================================================================

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_email(&req.email)?;

    let hashed_password = hash_password(&req.password)?;

    let user = state
        .store()
        .create_user(&CreateUserParams {
            username: req.username,
            hashed_password,
            full_name: req.full_name,
            email: req.email,
        })
        .await?;

    Ok(Json(user.into()))
}

async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.store().get_user(&username).await?;
    Ok(Json(user.into()))
}

fn validate_username(username: &str) -> Result<(), AppError> {
    let ok = !username.is_empty()
        && username.len() <= 64
        && username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !ok {
        return Err(AppError::InvalidRequest(
            "username must be lowercase alphanumeric or underscore".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 6 {
        return Err(AppError::InvalidRequest(
            "password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !well_formed {
        return Err(AppError::InvalidRequest("invalid email address".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("No Caps Allowed").is_err());
        assert!(validate_username("#3@ABCs@@@##").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("123").is_err());
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("email123").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@nodot").is_err());
    }

    #[test]
    fn test_list_query_bounds() {
        assert!(ListQuery { limit: 20, offset: 0 }.validate().is_ok());
        assert!(ListQuery { limit: 0, offset: 0 }.validate().is_err());
        assert!(ListQuery { limit: 500, offset: 0 }.validate().is_err());
        assert!(ListQuery { limit: 10, offset: -1 }.validate().is_err());
    }
}
