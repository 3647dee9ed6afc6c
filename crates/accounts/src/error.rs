//! The module contains the errors account operations can throw.
//!
//! - [`KeyNotFound`] thrown when a user does not exist.
//! - [`ExistingKey`] thrown when a username is already taken.
//! - [`Forbidden`] thrown when an inactive user tries to log in.
//!
//!  [`KeyNotFound`]: AccountsError::KeyNotFound
//!  [`ExistingKey`]: AccountsError::ExistingKey
//!  [`Forbidden`]: AccountsError::Forbidden
use sea_orm::DbErr;
use thiserror::Error;

/// Accounts custom errors.
#[derive(Error, Debug)]
pub enum AccountsError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Password hash: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for AccountsError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<argon2::password_hash::Error> for AccountsError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(value.to_string())
    }
}
