use thiserror::Error;

use crate::domain::{Currency, MinorUnits};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unrecognized currency code: {0}")]
    UnknownCurrency(String),

    #[error("Invalid counterparty {field}: {reason}")]
    InvalidCounterparty {
        field: &'static str,
        reason: String,
    },

    #[error("Invalid proof URL: {0}")]
    InvalidProofUrl(String),

    #[error("Insufficient {currency} balance: available {available}, requested {requested}")]
    InsufficientBalance {
        currency: Currency,
        available: MinorUnits,
        requested: MinorUnits,
    },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl LedgerError {
    /// True for malformed or out-of-range input, recovered at the boundary
    /// with nothing persisted. Callers map these to a bad-request response,
    /// [`LedgerError::InsufficientBalance`] to a rejected/conflict response,
    /// and [`LedgerError::Database`] to a transient failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount(_)
                | LedgerError::UnknownCurrency(_)
                | LedgerError::InvalidCounterparty { .. }
                | LedgerError::InvalidProofUrl(_)
        )
    }
}
