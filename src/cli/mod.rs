use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, Write};

use crate::application::LedgerService;
use crate::domain::{format_cents, net_change, parse_cents, Account, Cents, Transaction};
use crate::io::Exporter;

/// Banklet - account ledger
#[derive(Parser)]
#[command(name = "banklet")]
#[command(about = "Open accounts, deposit and withdraw, and keep a transaction history")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "BANKLET_DATABASE", default_value = "bank.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Open a new account
    Open {
        /// Account holder name
        holder: String,

        /// Opening balance (e.g., "1000.00" or "1000")
        #[arg(short, long, default_value = "0")]
        initial: String,
    },

    /// List all accounts
    Accounts,

    /// Deposit into an account
    Deposit {
        /// Account number
        account: String,

        /// Amount to deposit
        amount: String,
    },

    /// Withdraw from an account
    Withdraw {
        /// Account number
        account: String,

        /// Amount to withdraw
        amount: String,
    },

    /// Show the balance of an account
    Balance {
        /// Account number
        account: String,
    },

    /// Show the transaction history of an account
    History {
        /// Account number
        account: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export
        #[arg(value_enum)]
        export_type: ExportType,

        /// Account number (required for history)
        #[arg(short, long)]
        account: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json (default: csv, json for snapshot)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
    },

    /// Run the sample scenario: two accounts, a few operations, then a report
    Demo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportType {
    Accounts,
    History,
    Snapshot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    /// Log level implied by the flags, used when RUST_LOG is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Open { holder, initial } => {
                let service = LedgerService::connect(&self.database).await?;
                let initial_cents = parse_amount(&initial)?;
                let account_number = service.open_account(holder.clone(), initial_cents).await?;
                println!(
                    "Opened account {} for {} with ${}",
                    account_number,
                    holder,
                    format_cents(initial_cents)
                );
            }

            Commands::Accounts => {
                let service = LedgerService::connect(&self.database).await?;
                print_accounts(&service.list_accounts().await?);
            }

            Commands::Deposit { account, amount } => {
                let service = LedgerService::connect(&self.database).await?;
                let amount_cents = parse_amount(&amount)?;
                let mut account = service.require_account(&account).await?;

                deposit_or_bail(&service, &mut account, amount_cents).await?;
                println!(
                    "Deposited ${} into {}. Balance: ${}",
                    format_cents(amount_cents),
                    account.account_number,
                    format_cents(account.balance)
                );
            }

            Commands::Withdraw { account, amount } => {
                let service = LedgerService::connect(&self.database).await?;
                let amount_cents = parse_amount(&amount)?;
                let mut account = service.require_account(&account).await?;

                withdraw_or_bail(&service, &mut account, amount_cents).await?;
                println!(
                    "Withdrew ${} from {}. Balance: ${}",
                    format_cents(amount_cents),
                    account.account_number,
                    format_cents(account.balance)
                );
            }

            Commands::Balance { account } => {
                let service = LedgerService::connect(&self.database).await?;
                let account = service.require_account(&account).await?;
                let balance = service.get_balance(&account).await?;
                println!(
                    "{} ({}): ${}",
                    account.account_number,
                    account.holder_name,
                    format_cents(balance)
                );
            }

            Commands::History { account, format } => {
                let service = LedgerService::connect(&self.database).await?;
                run_history_command(&service, &account, format).await?;
            }

            Commands::Export {
                export_type,
                account,
                output,
                format,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, export_type, account, output, format).await?;
            }

            Commands::Demo => {
                let service = LedgerService::init(&self.database).await?;
                run_demo(&service).await?;
            }
        }

        Ok(())
    }
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_cents(input).with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}

/// Rejected mutations become errors so the process exits non-zero.
async fn deposit_or_bail(
    service: &LedgerService,
    account: &mut Account,
    amount: Cents,
) -> Result<()> {
    if !service.deposit(account, amount).await? {
        anyhow::bail!(
            "Deposit of ${} into {} rejected: amount must be positive and keep the balance in range",
            format_cents(amount),
            account.account_number
        );
    }
    Ok(())
}

async fn withdraw_or_bail(
    service: &LedgerService,
    account: &mut Account,
    amount: Cents,
) -> Result<()> {
    if !service.withdraw(account, amount).await? {
        anyhow::bail!(
            "Withdrawal of ${} from {} rejected: amount must be positive and at most the balance (${})",
            format_cents(amount),
            account.account_number,
            format_cents(account.balance)
        );
    }
    Ok(())
}

/// One line of the account listing.
pub fn account_line(account: &Account) -> String {
    format!(
        "Account Number: {}, Holder: {}, Balance: ${}",
        account.account_number,
        account.holder_name,
        format_cents(account.balance)
    )
}

/// One line of a transaction history.
pub fn transaction_line(transaction: &Transaction) -> String {
    format!(
        "{}: ${} on {}",
        transaction.kind,
        format_cents(transaction.amount_cents),
        transaction.timestamp.format("%Y-%m-%dT%H:%M:%S%.6f")
    )
}

fn print_accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts found.");
        return;
    }

    for account in accounts {
        println!("{}", account_line(account));
    }
}

async fn print_history(service: &LedgerService, account: &Account) -> Result<()> {
    let transactions = service.history(account).await?;
    if transactions.is_empty() {
        println!("No transactions for {}.", account.account_number);
        return Ok(());
    }

    for transaction in &transactions {
        println!("{}", transaction_line(transaction));
    }
    println!("Net change: ${}", format_cents(net_change(&transactions)));
    Ok(())
}

async fn run_history_command(
    service: &LedgerService,
    account_number: &str,
    format: OutputFormat,
) -> Result<()> {
    let exporter = Exporter::new(service);
    match format {
        OutputFormat::Table => {
            let account = service.require_account(account_number).await?;
            print_history(service, &account).await?;
        }
        OutputFormat::Json => {
            exporter
                .export_history_json(account_number, io::stdout())
                .await?;
            println!();
        }
        OutputFormat::Csv => {
            exporter
                .export_history_csv(account_number, io::stdout())
                .await?;
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    export_type: ExportType,
    account: Option<String>,
    output: Option<String>,
    format: Option<ExportFormat>,
) -> Result<()> {
    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create file: {}", path))?,
        ),
        None => Box::new(io::stdout()),
    };

    let exporter = Exporter::new(service);
    let count = match (export_type, format) {
        (ExportType::Accounts, None | Some(ExportFormat::Csv)) => {
            exporter.export_accounts_csv(writer).await?
        }
        (ExportType::Accounts, Some(ExportFormat::Json)) => {
            anyhow::bail!("Accounts export supports csv only; use snapshot for JSON")
        }
        (ExportType::History, format) => {
            let account = account.context("--account is required for history export")?;
            match format {
                None | Some(ExportFormat::Csv) => {
                    exporter.export_history_csv(&account, writer).await?
                }
                Some(ExportFormat::Json) => exporter.export_history_json(&account, writer).await?,
            }
        }
        (ExportType::Snapshot, None | Some(ExportFormat::Json)) => {
            exporter.export_snapshot_json(writer).await?
        }
        (ExportType::Snapshot, Some(ExportFormat::Csv)) => {
            anyhow::bail!("Snapshot export supports json only")
        }
    };

    eprintln!("Exported {} records", count);
    Ok(())
}

/// Two accounts, a deposit and a withdrawal on each, then the account list
/// and the first account's history.
async fn run_demo(service: &LedgerService) -> Result<()> {
    let alice_number = service.open_account("Alice", 100000).await?;
    let bob_number = service.open_account("Bob", 50000).await?;

    let mut alice = service.require_account(&alice_number).await?;
    deposit_or_bail(service, &mut alice, 50000).await?;
    withdraw_or_bail(service, &mut alice, 20000).await?;

    let mut bob = service.require_account(&bob_number).await?;
    deposit_or_bail(service, &mut bob, 100000).await?;
    withdraw_or_bail(service, &mut bob, 30000).await?;

    print_accounts(&service.list_accounts().await?);

    println!();
    println!("Transaction History for {}:", alice.holder_name);
    print_history(service, &alice).await
}
