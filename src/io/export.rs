use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{format_cents, Account, Transaction};

/// Full dump of the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

/// Writes ledger data out as CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export all accounts with their stored balances to CSV
    pub async fn export_accounts_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let accounts = self.service.list_accounts().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["account_number", "holder", "balance"])?;
        for account in &accounts {
            csv_writer.write_record([
                account.account_number.as_str(),
                account.holder_name.as_str(),
                &format_cents(account.balance),
            ])?;
        }

        csv_writer.flush()?;
        Ok(accounts.len())
    }

    /// Export one account's history to CSV, oldest first
    pub async fn export_history_csv<W: Write>(
        &self,
        account_number: &str,
        writer: W,
    ) -> Result<usize> {
        let transactions = self.history_of(account_number).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "timestamp", "type", "amount"])?;
        for transaction in &transactions {
            csv_writer.write_record([
                transaction.id.to_string(),
                transaction.timestamp.to_rfc3339(),
                transaction.kind.to_string(),
                format_cents(transaction.amount_cents),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export one account's history as a JSON array
    pub async fn export_history_json<W: Write>(
        &self,
        account_number: &str,
        writer: W,
    ) -> Result<usize> {
        let transactions = self.history_of(account_number).await?;
        serde_json::to_writer_pretty(writer, &transactions)?;
        Ok(transactions.len())
    }

    /// Export every account and transaction as one JSON document.
    /// Returns the number of records written (accounts + transactions).
    pub async fn export_snapshot_json<W: Write>(&self, writer: W) -> Result<usize> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            accounts: self.service.list_accounts().await?,
            transactions: self.service.list_all_transactions().await?,
        };

        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(snapshot.accounts.len() + snapshot.transactions.len())
    }

    async fn history_of(&self, account_number: &str) -> Result<Vec<Transaction>> {
        let account = self.service.require_account(account_number).await?;
        Ok(self.service.history(&account).await?)
    }
}
