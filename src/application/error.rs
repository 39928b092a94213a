use thiserror::Error;

use crate::domain::Cents;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Cents),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
