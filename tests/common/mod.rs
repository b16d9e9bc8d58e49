//! Common test utilities
#![allow(dead_code)]

use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use bankledger::domain::Currency;
use bankledger::store::{Account, CreateAccountParams, CreateUserParams, Store, User};

/// Connect to the test database, or skip the test when no DATABASE_URL is
/// configured. Fixtures use random identities, so tests do not depend on
/// a clean database and can run concurrently.
pub async fn try_connect() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    Some(pool)
}

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Random lowercase string of length `n`.
pub fn random_string(n: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

pub fn random_owner() -> String {
    random_string(12)
}

pub fn random_email() -> String {
    format!("{}@example.com", random_string(8))
}

/// Random non-negative balance.
pub fn random_balance() -> i64 {
    rand::thread_rng().gen_range(0..10_000)
}

/// Random signed entry amount.
pub fn random_entry_amount() -> i64 {
    rand::thread_rng().gen_range(-10_000..10_000)
}

pub fn random_currency() -> Currency {
    let all = Currency::all();
    all[rand::thread_rng().gen_range(0..all.len())]
}

pub async fn create_test_user(store: &Store) -> User {
    store
        .create_user(&CreateUserParams {
            username: random_owner(),
            hashed_password: "test-hash".to_string(),
            full_name: random_string(10),
            email: random_email(),
        })
        .await
        .expect("Failed to create test user")
}

/// Create an account with a fresh owner. The opening balance is written
/// directly, without a backing entry.
pub async fn create_test_account(store: &Store, balance: i64, currency: Currency) -> Account {
    let user = create_test_user(store).await;
    store
        .create_account(&CreateAccountParams {
            owner: user.username,
            balance,
            currency: currency.code().to_string(),
        })
        .await
        .expect("Failed to create test account")
}

/// Create an account whose opening balance is backed by a seed entry, so
/// `balance == sum(entries)` holds from the start.
pub async fn create_funded_account(store: &Store, balance: i64, currency: Currency) -> Account {
    let account = create_test_account(store, balance, currency).await;
    if balance != 0 {
        store
            .create_entry(account.id, balance)
            .await
            .expect("Failed to seed opening entry");
    }
    account
}
