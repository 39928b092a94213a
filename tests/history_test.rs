mod common;

use anyhow::Result;
use banklet::domain::{
    implied_opening_balance, net_change, replay_balance, total_of_kind, TransactionKind,
};
use common::{open, test_service};

#[tokio::test]
async fn test_history_is_oldest_first() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut account = open(&service, "Alice", 0).await?;

    for amount in [100, 200, 300] {
        service.deposit(&mut account, amount).await?;
    }
    service.withdraw(&mut account, 50).await?;

    let history = service.history(&account).await?;
    let amounts: Vec<_> = history.iter().map(|t| t.amount_cents).collect();
    assert_eq!(amounts, vec![100, 200, 300, 50]);
    assert!(history.windows(2).all(|w| w[0].id < w[1].id));
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    Ok(())
}

#[tokio::test]
async fn test_signed_history_matches_balance_movement() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let opening = 25000;
    let mut account = open(&service, "Alice", opening).await?;

    // Mix of accepted and rejected operations.
    service.deposit(&mut account, 1000).await?;
    service.withdraw(&mut account, 999999).await?;
    service.withdraw(&mut account, 7500).await?;
    service.deposit(&mut account, 0).await?;
    service.deposit(&mut account, 333).await?;
    service.withdraw(&mut account, 18833).await?;
    service.withdraw(&mut account, 1).await?;

    let balance = service.get_balance(&account).await?;
    let history = service.history(&account).await?;

    assert_eq!(history.len(), 4);
    assert_eq!(net_change(&history), balance - opening);
    assert_eq!(replay_balance(opening, &history), balance);
    assert_eq!(implied_opening_balance(balance, &history), opening);
    assert_eq!(balance, 0);

    Ok(())
}

#[tokio::test]
async fn test_histories_are_per_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut alice = open(&service, "Alice", 100000).await?;
    let mut bob = open(&service, "Bob", 50000).await?;

    service.deposit(&mut alice, 50000).await?;
    service.deposit(&mut bob, 100000).await?;
    service.withdraw(&mut alice, 20000).await?;
    service.withdraw(&mut bob, 30000).await?;

    let alice_history = service.history(&alice).await?;
    let bob_history = service.history(&bob).await?;

    assert!(alice_history.iter().all(|t| t.account_number == "1000"));
    assert!(bob_history.iter().all(|t| t.account_number == "1001"));
    assert_eq!(total_of_kind(TransactionKind::Deposit, &bob_history), 100000);
    assert_eq!(
        total_of_kind(TransactionKind::Withdrawal, &bob_history),
        30000
    );
    assert_eq!(service.list_all_transactions().await?.len(), 4);

    Ok(())
}
