use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::domain::{Account, Cents, Transaction, TransactionKind};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying accounts and their transactions.
///
/// Every public operation is a single statement, except `record_mutation`
/// which commits a balance change and its transaction record together.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database {}", database_url))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they don't exist yet.
    pub async fn migrate(&self) -> Result<()> {
        debug!("running migration 001");
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a new account row.
    pub async fn insert_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (account_number, account_holder, balance)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&account.account_number)
        .bind(&account.holder_name)
        .bind(account.balance)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert account {}", account.account_number))?;
        Ok(())
    }

    /// Get an account by number.
    pub async fn fetch_account(&self, account_number: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT account_number, account_holder, balance
            FROM accounts
            WHERE account_number = ?
            "#,
        )
        .bind(account_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// List all accounts, ordered by account number.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT account_number, account_holder, balance FROM accounts ORDER BY account_number",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    /// Number of stored accounts.
    pub async fn count_accounts(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM accounts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count accounts")?;
        Ok(row.try_get("count")?)
    }

    /// Add `delta` (possibly negative) to the stored balance.
    pub async fn update_balance(&self, account_number: &str, delta: Cents) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        Self::apply_delta(&mut conn, account_number, delta).await
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        Ok(Account {
            account_number: row.try_get("account_number")?,
            holder_name: row.try_get("account_holder")?,
            balance: row
                .try_get("balance")
                .context("Invalid account balance")?,
        })
    }

    // ========================
    // Transaction operations
    // ========================

    /// Append a transaction record and assign its id.
    pub async fn append_transaction(&self, transaction: &mut Transaction) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        Self::insert_transaction(&mut conn, transaction).await
    }

    /// Apply the transaction's signed amount to the balance and append the
    /// record, committing both or neither.
    pub async fn record_mutation(&self, transaction: &mut Transaction) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        Self::apply_delta(
            &mut tx,
            &transaction.account_number,
            transaction.signed_amount(),
        )
        .await?;
        Self::insert_transaction(&mut tx, transaction).await?;

        tx.commit().await.context("Failed to commit mutation")?;
        debug!(
            id = transaction.id,
            account = %transaction.account_number,
            kind = %transaction.kind,
            amount = transaction.amount_cents,
            "mutation committed"
        );
        Ok(())
    }

    /// List transactions for an account, oldest first.
    pub async fn list_transactions(&self, account_number: &str) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_number, transaction_type, amount, timestamp
            FROM transactions
            WHERE account_number = ?
            ORDER BY id
            "#,
        )
        .bind(account_number)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List every transaction in the ledger, in insertion order.
    pub async fn list_all_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_number, transaction_type, amount, timestamp
            FROM transactions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list all transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    async fn apply_delta(
        conn: &mut SqliteConnection,
        account_number: &str,
        delta: Cents,
    ) -> Result<()> {
        let result =
            sqlx::query("UPDATE accounts SET balance = balance + ? WHERE account_number = ?")
                .bind(delta)
                .bind(account_number)
                .execute(&mut *conn)
                .await
                .with_context(|| format!("Failed to update balance of {}", account_number))?;

        if result.rows_affected() == 0 {
            anyhow::bail!("No account {} to update", account_number);
        }
        Ok(())
    }

    async fn insert_transaction(
        conn: &mut SqliteConnection,
        transaction: &mut Transaction,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (account_number, transaction_type, amount, timestamp)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.account_number)
        .bind(transaction.kind.as_str())
        .bind(transaction.amount_cents)
        .bind(transaction.timestamp.to_rfc3339())
        .execute(&mut *conn)
        .await
        .context("Failed to append transaction")?;

        transaction.id = result.last_insert_rowid();
        Ok(())
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let kind_str: String = row.try_get("transaction_type")?;
        let timestamp_str: String = row.try_get("timestamp")?;

        Ok(Transaction {
            id: row.try_get("id")?,
            account_number: row.try_get("account_number")?,
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction type: {}", kind_str))?,
            amount_cents: row.try_get("amount").context("Invalid transaction amount")?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .context("Invalid transaction timestamp")?
                .with_timezone(&Utc),
        })
    }
}
