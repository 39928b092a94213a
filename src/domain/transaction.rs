use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountNumber, Cents};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            _ => None,
        }
    }

    /// Sign applied to the amount when it hits the balance.
    pub fn sign(&self) -> Cents {
        match self {
            TransactionKind::Deposit => 1,
            TransactionKind::Withdrawal => -1,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable record of one balance-changing event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the store on append; 0 until then
    pub id: TransactionId,
    pub account_number: AccountNumber,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_number: impl Into<AccountNumber>,
        kind: TransactionKind,
        amount_cents: Cents,
        timestamp: DateTime<Utc>,
    ) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: 0,
            account_number: account_number.into(),
            kind,
            amount_cents,
            timestamp,
        }
    }

    pub fn deposit(account_number: impl Into<AccountNumber>, amount_cents: Cents) -> Self {
        Self::new(account_number, TransactionKind::Deposit, amount_cents, Utc::now())
    }

    pub fn withdrawal(account_number: impl Into<AccountNumber>, amount_cents: Cents) -> Self {
        Self::new(
            account_number,
            TransactionKind::Withdrawal,
            amount_cents,
            Utc::now(),
        )
    }

    /// The change this transaction makes to the account balance.
    pub fn signed_amount(&self) -> Cents {
        self.kind.sign() * self.amount_cents
    }
}
