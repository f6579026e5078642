//! The module contains the error the engine can throw.
//!
//! Pure computations (expression evaluation, share allocation, balance
//! aggregation) only fail on invalid caller input; everything persistence
//! related surfaces as [`Database`].
//!
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
    #[error("Invalid shares: {0}")]
    InvalidShares(String),
    #[error("Unsupported currency: {0}")]
    UnknownCurrency(String),
    #[error("Missing phone number: {0}")]
    MissingPhoneNumber(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidExpression(a), Self::InvalidExpression(b)) => a == b,
            (Self::InvalidShares(a), Self::InvalidShares(b)) => a == b,
            (Self::UnknownCurrency(a), Self::UnknownCurrency(b)) => a == b,
            (Self::MissingPhoneNumber(a), Self::MissingPhoneNumber(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
