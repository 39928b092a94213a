mod common;

use anyhow::Result;
use banklet::domain::{Account, Transaction, TransactionKind};
use common::test_repository;

#[tokio::test]
async fn test_insert_and_fetch_account() -> Result<()> {
    let (repo, _temp) = test_repository().await?;

    repo.insert_account(&Account::new("1000", "Alice", 1234)).await?;

    let fetched = repo.fetch_account("1000").await?;
    assert_eq!(fetched, Some(Account::new("1000", "Alice", 1234)));
    assert_eq!(repo.fetch_account("1001").await?, None);
    assert_eq!(repo.count_accounts().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_primary_key_is_an_error() -> Result<()> {
    let (repo, _temp) = test_repository().await?;

    repo.insert_account(&Account::new("1000", "Alice", 0)).await?;
    let result = repo.insert_account(&Account::new("1000", "Mallory", 0)).await;

    assert!(result.is_err());
    assert_eq!(repo.fetch_account("1000").await?.unwrap().holder_name, "Alice");

    Ok(())
}

#[tokio::test]
async fn test_update_balance_applies_delta() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    repo.insert_account(&Account::new("1000", "Alice", 10000)).await?;

    repo.update_balance("1000", 2500).await?;
    repo.update_balance("1000", -500).await?;

    assert_eq!(repo.fetch_account("1000").await?.unwrap().balance, 12000);

    Ok(())
}

#[tokio::test]
async fn test_update_balance_of_missing_account_fails() -> Result<()> {
    let (repo, _temp) = test_repository().await?;

    assert!(repo.update_balance("9999", 100).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_update_balance_cannot_go_negative() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    repo.insert_account(&Account::new("1000", "Alice", 100)).await?;

    assert!(repo.update_balance("1000", -101).await.is_err());
    assert_eq!(repo.fetch_account("1000").await?.unwrap().balance, 100);

    Ok(())
}

#[tokio::test]
async fn test_append_transaction_assigns_increasing_ids() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    repo.insert_account(&Account::new("1000", "Alice", 0)).await?;

    let mut first = Transaction::deposit("1000", 500);
    let mut second = Transaction::withdrawal("1000", 200);
    repo.append_transaction(&mut first).await?;
    repo.append_transaction(&mut second).await?;

    assert!(first.id > 0);
    assert!(second.id > first.id);

    // Appending alone does not move the balance.
    assert_eq!(repo.fetch_account("1000").await?.unwrap().balance, 0);

    let listed = repo.list_transactions("1000").await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[0].kind, TransactionKind::Deposit);
    assert_eq!(listed[1].kind, TransactionKind::Withdrawal);
    assert_eq!(
        listed[0].timestamp.timestamp_micros(),
        first.timestamp.timestamp_micros()
    );

    Ok(())
}

#[tokio::test]
async fn test_transaction_for_unknown_account_is_refused() -> Result<()> {
    let (repo, _temp) = test_repository().await?;

    let mut orphan = Transaction::deposit("9999", 500);
    assert!(repo.append_transaction(&mut orphan).await.is_err());
    assert!(repo.list_all_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_record_mutation_updates_both_tables() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    repo.insert_account(&Account::new("1000", "Alice", 1000)).await?;

    let mut withdrawal = Transaction::withdrawal("1000", 400);
    repo.record_mutation(&mut withdrawal).await?;

    assert!(withdrawal.id > 0);
    assert_eq!(repo.fetch_account("1000").await?.unwrap().balance, 600);
    assert_eq!(repo.list_transactions("1000").await?, vec![withdrawal]);

    Ok(())
}

#[tokio::test]
async fn test_failed_mutation_leaves_no_trace() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    repo.insert_account(&Account::new("1000", "Alice", 1000)).await?;

    let mut overdraft = Transaction::withdrawal("1000", 5000);
    assert!(repo.record_mutation(&mut overdraft).await.is_err());

    assert_eq!(repo.fetch_account("1000").await?.unwrap().balance, 1000);
    assert!(repo.list_transactions("1000").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_transactions_is_scoped_to_account() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    repo.insert_account(&Account::new("1000", "Alice", 0)).await?;
    repo.insert_account(&Account::new("1001", "Bob", 0)).await?;

    repo.record_mutation(&mut Transaction::deposit("1000", 100)).await?;
    repo.record_mutation(&mut Transaction::deposit("1001", 200)).await?;
    repo.record_mutation(&mut Transaction::deposit("1000", 300)).await?;

    let alice: Vec<_> = repo
        .list_transactions("1000")
        .await?
        .into_iter()
        .map(|t| t.amount_cents)
        .collect();
    assert_eq!(alice, vec![100, 300]);
    assert_eq!(repo.list_all_transactions().await?.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_update_balance_rejects_integer_overflow() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    repo.insert_account(&Account::new("1000", "Alice", 10)).await?;

    assert!(repo.update_balance("1000", i64::MAX).await.is_err());
    assert_eq!(repo.fetch_account("1000").await?.unwrap().balance, 10);
    assert_eq!(repo.list_accounts().await?.len(), 1);

    Ok(())
}
