//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a user, group, membership or transaction does
//!   not exist.
//! - [`Forbidden`] thrown when the caller is not a member of the group (reads)
//!   or not the creator of the transaction (edits and deletes).
//! - [`InvalidInput`], [`InvalidAmount`] and [`InvalidPayer`] thrown when the
//!   request itself is malformed.
//! - [`ExistingKey`] thrown on duplicates (username, membership).
//! - [`Database`] thrown when the store fails. Any open scoped transaction is
//!   rolled back.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidPayer`]: EngineError::InvalidPayer
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Database`]: EngineError::Database
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid payer: {0}")]
    InvalidPayer(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` for every error caused by a malformed request.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::InvalidAmount(_) | Self::InvalidPayer(_)
        )
    }

    /// Maps a unique-constraint violation reported by the store to
    /// [`EngineError::ExistingKey`], keeping every other failure as is.
    pub(crate) fn conflict_or_db(err: DbErr, key: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::ExistingKey(key.to_string()),
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidPayer(a), Self::InvalidPayer(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
