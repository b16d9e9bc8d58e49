//! Integration tests for the record store.
//!
//! Require a Postgres instance reachable via DATABASE_URL with the
//! migrations applied; each test skips itself when the variable is unset.

use bankledger::domain::Currency;
use bankledger::store::{CreateTransferParams, CreateUserParams, Store, StoreError};

mod common;

// =========================================================================
// Accounts
// =========================================================================

#[tokio::test]
async fn test_create_and_get_account() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let created = common::create_test_account(&store, 250, Currency::Usd).await;
    assert!(created.id > 0);
    assert_eq!(created.balance, 250);
    assert_eq!(created.currency, "USD");

    let fetched = store.get_account(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_missing_account_is_not_found() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let err = store.get_account(i64::MAX).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn test_set_account_balance() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 100, Currency::Eur).await;
    let updated = store.set_account_balance(account.id, 9_000).await.unwrap();

    assert_eq!(updated.id, account.id);
    assert_eq!(updated.balance, 9_000);
    assert_eq!(updated.owner, account.owner);
    assert_eq!(updated.currency, account.currency);
}

#[tokio::test]
async fn test_add_account_balance_applies_signed_deltas() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 1_000, Currency::Usd).await;

    let credited = store.add_account_balance(account.id, 300).await.unwrap();
    assert_eq!(credited.balance, 1_300);

    let debited = store.add_account_balance(account.id, -500).await.unwrap();
    assert_eq!(debited.balance, 800);
}

#[tokio::test]
async fn test_delete_account() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Cad).await;
    store.delete_account(account.id).await.unwrap();

    let err = store.get_account(account.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    let err = store.delete_account(account.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn test_list_accounts_pagination() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    for _ in 0..10 {
        common::create_test_account(&store, common::random_balance(), common::random_currency())
            .await;
    }

    let page = store.list_accounts(5, 5).await.unwrap();
    assert_eq!(page.len(), 5);

    // Ordered by id, so consecutive pages do not overlap.
    let first = store.list_accounts(5, 0).await.unwrap();
    assert!(first.last().unwrap().id < page.first().unwrap().id);
}

#[tokio::test]
async fn test_duplicate_owner_currency_account_already_exists() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Usd).await;

    let err = store
        .create_account(&bankledger::store::CreateAccountParams {
            owner: account.owner.clone(),
            balance: 0,
            currency: account.currency.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists));
}

// =========================================================================
// Entries
// =========================================================================

#[tokio::test]
async fn test_create_and_get_entry() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Usd).await;
    let amount = common::random_entry_amount();

    let entry = store.create_entry(account.id, amount).await.unwrap();
    assert!(entry.id > 0);
    assert_eq!(entry.account_id, account.id);
    assert_eq!(entry.amount, amount);

    let fetched = store.get_entry(entry.id).await.unwrap();
    assert_eq!(fetched, entry);
}

#[tokio::test]
async fn test_update_entry_correction() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Usd).await;
    let entry = store.create_entry(account.id, 100).await.unwrap();

    let corrected = store.update_entry(entry.id, -100).await.unwrap();
    assert_eq!(corrected.id, entry.id);
    assert_eq!(corrected.account_id, account.id);
    assert_eq!(corrected.amount, -100);
}

#[tokio::test]
async fn test_delete_entry() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Usd).await;
    let entry = store.create_entry(account.id, 42).await.unwrap();

    store.delete_entry(entry.id).await.unwrap();
    let err = store.get_entry(entry.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn test_list_account_entries_pagination() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Usd).await;
    for _ in 0..10 {
        store
            .create_entry(account.id, common::random_entry_amount())
            .await
            .unwrap();
    }

    let page = store.list_account_entries(account.id, 5, 5).await.unwrap();
    assert_eq!(page.len(), 5);
    assert!(page.iter().all(|e| e.account_id == account.id));
}

#[tokio::test]
async fn test_sum_account_entries() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Usd).await;
    assert_eq!(store.sum_account_entries(account.id).await.unwrap(), 0);

    for amount in [500, -200, 75] {
        store.create_entry(account.id, amount).await.unwrap();
    }
    assert_eq!(store.sum_account_entries(account.id).await.unwrap(), 375);
}

// =========================================================================
// Transfers
// =========================================================================

#[tokio::test]
async fn test_create_and_get_transfer() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let sender = common::create_test_account(&store, 0, Currency::Usd).await;
    let receiver = common::create_test_account(&store, 0, Currency::Usd).await;

    let transfer = store
        .create_transfer(&CreateTransferParams {
            from_account_id: sender.id,
            to_account_id: receiver.id,
            amount: 150,
        })
        .await
        .unwrap();
    assert!(transfer.id > 0);
    assert_eq!(transfer.from_account_id, sender.id);
    assert_eq!(transfer.to_account_id, receiver.id);
    assert_eq!(transfer.amount, 150);

    let fetched = store.get_transfer(transfer.id).await.unwrap();
    assert_eq!(fetched, transfer);
}

#[tokio::test]
async fn test_delete_transfer() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let sender = common::create_test_account(&store, 0, Currency::Usd).await;
    let receiver = common::create_test_account(&store, 0, Currency::Usd).await;
    let transfer = store
        .create_transfer(&CreateTransferParams {
            from_account_id: sender.id,
            to_account_id: receiver.id,
            amount: 10,
        })
        .await
        .unwrap();

    store.delete_transfer(transfer.id).await.unwrap();
    let err = store.get_transfer(transfer.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn test_list_account_transfers_covers_both_directions() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let a = common::create_test_account(&store, 0, Currency::Usd).await;
    let b = common::create_test_account(&store, 0, Currency::Usd).await;

    for _ in 0..3 {
        store
            .create_transfer(&CreateTransferParams {
                from_account_id: a.id,
                to_account_id: b.id,
                amount: 10,
            })
            .await
            .unwrap();
        store
            .create_transfer(&CreateTransferParams {
                from_account_id: b.id,
                to_account_id: a.id,
                amount: 10,
            })
            .await
            .unwrap();
    }

    let touching_a = store.list_account_transfers(a.id, 20, 0).await.unwrap();
    assert_eq!(touching_a.len(), 6);
}

// =========================================================================
// Users
// =========================================================================

#[tokio::test]
async fn test_create_and_get_user() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let created = common::create_test_user(&store).await;
    let fetched = store.get_user(&created.username).await.unwrap();

    assert_eq!(fetched.username, created.username);
    assert_eq!(fetched.hashed_password, created.hashed_password);
    assert_eq!(fetched.full_name, created.full_name);
    assert_eq!(fetched.email, created.email);
}

#[tokio::test]
async fn test_duplicate_username_already_exists() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let user = common::create_test_user(&store).await;

    let err = store
        .create_user(&CreateUserParams {
            username: user.username.clone(),
            hashed_password: "test-hash".to_string(),
            full_name: "Someone Else".to_string(),
            email: common::random_email(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists));
}

#[tokio::test]
async fn test_duplicate_email_already_exists() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let user = common::create_test_user(&store).await;

    let err = store
        .create_user(&CreateUserParams {
            username: common::random_owner(),
            hashed_password: "test-hash".to_string(),
            full_name: "Someone Else".to_string(),
            email: user.email.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists));
}

// =========================================================================
// Units of work
// =========================================================================

#[tokio::test]
async fn test_dropped_transaction_rolls_back() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Usd).await;

    {
        let mut tx = store.begin().await.unwrap();
        bankledger::store::entries::create(&mut *tx, account.id, 999)
            .await
            .unwrap();
        // Dropped without commit.
    }

    assert_eq!(store.sum_account_entries(account.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_committed_transaction_is_visible() {
    let Some(pool) = common::try_connect().await else { return };
    let store = Store::new(pool);

    let account = common::create_test_account(&store, 0, Currency::Usd).await;

    let mut tx = store
        .begin_with(bankledger::store::IsolationLevel::Serializable)
        .await
        .unwrap();
    bankledger::store::entries::create(&mut *tx, account.id, 123)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(store.sum_account_entries(account.id).await.unwrap(), 123);
}
