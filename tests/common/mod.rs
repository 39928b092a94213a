// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use banklet::application::LedgerService;
use banklet::domain::{Account, Cents};
use banklet::storage::Repository;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::init(db_path(&temp_dir).as_str()).await?;
    Ok((service, temp_dir))
}

/// Helper to open a raw repository on a temporary database
pub async fn test_repository() -> Result<(Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let url = format!("sqlite:{}?mode=rwc", db_path(&temp_dir));
    let repo = Repository::init(&url).await?;
    Ok((repo, temp_dir))
}

/// Path of the database file inside a temp dir
pub fn db_path(temp_dir: &TempDir) -> String {
    temp_dir.path().join("test.db").to_str().unwrap().to_string()
}

/// Open an account and load it back from the store
pub async fn open(service: &LedgerService, holder: &str, initial: Cents) -> Result<Account> {
    let number = service.open_account(holder, initial).await?;
    Ok(service.get_account(&number).await?.unwrap())
}
