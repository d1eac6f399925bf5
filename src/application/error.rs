use thiserror::Error;

use crate::domain::CustomerId;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Invalid account name or password")]
    InvalidCredentials,

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
