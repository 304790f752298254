//! Order history database for the dealer
//!
//! Keeps an append-only record of the hedge orders placed on exchanges and
//! the 0x orders quoted to takers. MySQL in production (feature `mysql`,
//! on by default), in-memory for tests.

pub mod error;
pub mod records;
pub mod store;

pub use error::StorageError;
pub use records::{ExchangeOrder, ZeroExOrder};
pub use store::{InMemoryOrderHistory, OrderHistoryStore};
#[cfg(feature = "mysql")]
pub use store::MySqlOrderHistory;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
