use serde::{Deserialize, Serialize};

use super::Cents;

pub type AccountNumber = String;

/// Account numbers are handed out sequentially starting here.
pub const ACCOUNT_NUMBER_OFFSET: i64 = 1000;

/// Derive the next account number from the number of accounts already stored.
///
/// Two callers reading the same count get the same number; the store's
/// primary key is what finally rejects the second one.
pub fn next_account_number(existing_accounts: i64) -> AccountNumber {
    (existing_accounts + ACCOUNT_NUMBER_OFFSET).to_string()
}

/// A named holder of a balance.
///
/// Values handed out by the service act as an in-memory mirror of the stored
/// row: deposits and withdrawals made through the service keep `balance` in
/// step, but writes from elsewhere are not reflected until the account is
/// fetched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_number: AccountNumber,
    pub holder_name: String,
    /// Balance in cents, never negative
    pub balance: Cents,
}

impl Account {
    pub fn new(
        account_number: impl Into<AccountNumber>,
        holder_name: impl Into<String>,
        balance: Cents,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            holder_name: holder_name.into(),
            balance,
        }
    }

    /// Deposits must be strictly positive and keep the balance representable.
    pub fn can_deposit(&self, amount: Cents) -> bool {
        amount > 0 && self.balance.checked_add(amount).is_some()
    }

    /// Withdrawals must be strictly positive and covered by the balance.
    pub fn can_withdraw(&self, amount: Cents) -> bool {
        amount > 0 && amount <= self.balance
    }
}
