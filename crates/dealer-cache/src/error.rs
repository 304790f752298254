//! Dealer cache error types

use thiserror::Error;

use crate::codec::CodecError;
use crate::store::StoreError;

/// Errors returned by [`DealerCache`](crate::DealerCache) operations
#[derive(Error, Debug)]
pub enum DealerCacheError {
    /// Malformed quote id or symbol; detected before any store access
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] common::Error),

    /// No order mark stored under this quote id
    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    /// No snapshot has been written for this book
    #[error("Order book not found: {0}")]
    OrderBookNotFound(String),

    /// Snapshot exists but is older than the caller's budget
    #[error("Order book {key} is {overage_secs}s out of date (age {age_secs}s)")]
    StaleData {
        key: String,
        age_secs: f64,
        overage_secs: f64,
    },

    /// Stored record is missing a field or cannot be decoded
    #[error("Data corruption in {key}: {source}")]
    DataCorruption {
        key: String,
        #[source]
        source: CodecError,
    },

    /// Status update kept losing the compare-and-set race
    #[error("Status update for quote {quote_id} conflicted {attempts} times")]
    UpdateConflict { quote_id: String, attempts: u32 },

    /// Store unreachable or returned an error
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DealerCacheError {
    pub(crate) fn corruption(key: impl Into<String>) -> impl FnOnce(CodecError) -> Self {
        let key = key.into();
        move |source| Self::DataCorruption { key, source }
    }

    /// Quote or order book does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::QuoteNotFound(_) | Self::OrderBookNotFound(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleData { .. })
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Overage in seconds for stale data
    pub fn overage_secs(&self) -> Option<f64> {
        match self {
            Self::StaleData { overage_secs, .. } => Some(*overage_secs),
            _ => None,
        }
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, DealerCacheError>;
