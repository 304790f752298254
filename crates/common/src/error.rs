//! Common error types for the dealer workspace

use thiserror::Error;

/// Error raised when a shared domain value fails to parse or validate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Symbol is not in `BASE/QUOTE` form
    #[error("Invalid symbol '{0}': must be BASE_TICKER/QUOTE_TICKER format")]
    InvalidSymbol(String),

    /// Quote identifier is not a UUID
    #[error("Invalid quote ID '{0}': not a UUID")]
    InvalidQuoteId(String),

    /// Unknown quote status code or name
    #[error("Invalid quote status: {0}")]
    InvalidStatus(String),

    /// Other invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
