//! Order history store implementations

pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod traits;

pub use memory::InMemoryOrderHistory;
#[cfg(feature = "mysql")]
pub use mysql::MySqlOrderHistory;
pub use traits::OrderHistoryStore;
