//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when an input field is missing or malformed.
//! - [`InvalidPayload`] thrown when a structured payload cannot be decoded.
//! - [`NotFound`] thrown when an item does not exist or belongs to another user.
//! - [`Invariant`] thrown when a business rule rejects the change.
//! - [`Failed`] thrown when persisting a named action fails.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidPayload`]: EngineError::InvalidPayload
//!  [`NotFound`]: EngineError::NotFound
//!  [`Invariant`]: EngineError::Invariant
//!  [`Failed`]: EngineError::Failed
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
///
/// The `Display` text of every variant except [`EngineError::Database`] is safe
/// to show to the user.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidPayload(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Invariant(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Setup has already been completed.")]
    AlreadyInitialized,
    #[error("Failed to {action}.")]
    Failed {
        action: &'static str,
        #[source]
        source: DbErr,
    },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Turns a raw database error into the generic failure of `action`.
    ///
    /// Domain errors pass through untouched.
    pub fn failed(self, action: &'static str) -> Self {
        match self {
            Self::Database(source) => Self::Failed { action, source },
            other => other,
        }
    }

    pub(crate) fn validation(message: &str) -> Self {
        Self::Validation(message.to_string())
    }

    pub(crate) fn not_found(message: &str) -> Self {
        Self::NotFound(message.to_string())
    }

    pub(crate) fn invariant(message: &str) -> Self {
        Self::Invariant(message.to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidPayload(a), Self::InvalidPayload(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Invariant(a), Self::Invariant(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::AlreadyInitialized, Self::AlreadyInitialized) => true,
            (
                Self::Failed {
                    action: a,
                    source: sa,
                },
                Self::Failed {
                    action: b,
                    source: sb,
                },
            ) => a == b && sa.to_string() == sb.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_wraps_database_errors_only() {
        let err = EngineError::Database(DbErr::Custom("disk full".to_string())).failed("update plan");
        assert_eq!(err.to_string(), "Failed to update plan.");

        let err = EngineError::validation("Plan name is required.").failed("update plan");
        assert_eq!(err, EngineError::validation("Plan name is required."));
    }
}
