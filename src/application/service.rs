use tracing::{debug, info};

use crate::domain::{next_account_number, Account, AccountNumber, Cents, Transaction};
use crate::storage::Repository;

use super::AppError;

/// Application service providing the account operations of the ledger.
/// This is the primary interface for any client (CLI, tests, embedding code).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open (creating if needed) the database at the given path and
    /// make sure the tables exist.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Underlying repository, for callers that need raw store access.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Account operations
    // ========================

    /// Open a new account and return its number.
    pub async fn open_account(
        &self,
        holder_name: impl Into<String>,
        initial_balance: Cents,
    ) -> Result<AccountNumber, AppError> {
        if initial_balance < 0 {
            return Err(AppError::InvalidAmount(initial_balance));
        }

        let count = self.repo.count_accounts().await?;
        let account_number = next_account_number(count);

        if self.repo.fetch_account(&account_number).await?.is_some() {
            return Err(AppError::AccountAlreadyExists(account_number));
        }

        let account = Account::new(account_number, holder_name, initial_balance);
        self.repo.insert_account(&account).await?;

        info!(
            account = %account.account_number,
            holder = %account.holder_name,
            balance = account.balance,
            "account opened"
        );
        Ok(account.account_number)
    }

    /// Look up an account. Missing accounts are `None`, not an error.
    pub async fn get_account(&self, account_number: &str) -> Result<Option<Account>, AppError> {
        Ok(self.repo.fetch_account(account_number).await?)
    }

    /// Look up an account that must exist.
    pub async fn require_account(&self, account_number: &str) -> Result<Account, AppError> {
        self.get_account(account_number)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_number.to_string()))
    }

    /// List all accounts.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    // ========================
    // Balance mutations
    // ========================

    /// Deposit into the account. Returns `false` without touching the store
    /// when the amount is not positive.
    pub async fn deposit(&self, account: &mut Account, amount: Cents) -> Result<bool, AppError> {
        if !account.can_deposit(amount) {
            debug!(account = %account.account_number, amount, "deposit rejected");
            return Ok(false);
        }

        let mut transaction = Transaction::deposit(account.account_number.clone(), amount);
        self.repo.record_mutation(&mut transaction).await?;
        account.balance += amount;

        info!(
            account = %account.account_number,
            amount,
            balance = account.balance,
            "deposit applied"
        );
        Ok(true)
    }

    /// Withdraw from the account. Returns `false` without touching the store
    /// when the amount is not positive or exceeds the account's balance.
    pub async fn withdraw(&self, account: &mut Account, amount: Cents) -> Result<bool, AppError> {
        if !account.can_withdraw(amount) {
            debug!(
                account = %account.account_number,
                amount,
                balance = account.balance,
                "withdrawal rejected"
            );
            return Ok(false);
        }

        let mut transaction = Transaction::withdrawal(account.account_number.clone(), amount);
        self.repo.record_mutation(&mut transaction).await?;
        account.balance -= amount;

        info!(
            account = %account.account_number,
            amount,
            balance = account.balance,
            "withdrawal applied"
        );
        Ok(true)
    }

    // ========================
    // Queries
    // ========================

    /// Authoritative balance from the store. An account whose row has gone
    /// missing reads as zero.
    pub async fn get_balance(&self, account: &Account) -> Result<Cents, AppError> {
        Ok(self
            .repo
            .fetch_account(&account.account_number)
            .await?
            .map(|stored| stored.balance)
            .unwrap_or(0))
    }

    /// Transaction history of the account, oldest first.
    pub async fn history(&self, account: &Account) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions(&account.account_number).await?)
    }

    /// Every transaction in the ledger, oldest first.
    pub async fn list_all_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_all_transactions().await?)
    }
}
