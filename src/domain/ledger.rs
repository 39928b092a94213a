use super::{Cents, Transaction, TransactionKind};

/// Net effect of a history on the balance: deposits minus withdrawals.
pub fn net_change(transactions: &[Transaction]) -> Cents {
    transactions.iter().map(Transaction::signed_amount).sum()
}

/// Rebuild a balance by replaying a history on top of the opening balance.
pub fn replay_balance(opening_balance: Cents, transactions: &[Transaction]) -> Cents {
    opening_balance + net_change(transactions)
}

/// Sum of all amounts of one kind.
pub fn total_of_kind(kind: TransactionKind, transactions: &[Transaction]) -> Cents {
    transactions
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount_cents)
        .sum()
}

/// Opening balance implied by the current balance and the history so far.
pub fn implied_opening_balance(current_balance: Cents, transactions: &[Transaction]) -> Cents {
    current_balance - net_change(transactions)
}
