//! Order history store trait

use async_trait::async_trait;

use crate::records::{ExchangeOrder, ZeroExOrder};
use crate::Result;

/// Append-only history of hedge orders and quoted 0x orders
#[async_trait]
pub trait OrderHistoryStore: Send + Sync {
    /// Create the history tables if they do not exist
    async fn init_tables(&self) -> Result<()>;

    /// Record a hedge order. Fails with `Duplicate` on a repeated order id.
    async fn add_exchange_order(&self, order: &ExchangeOrder) -> Result<()>;

    /// Record a quoted 0x order. Fails with `Duplicate` on a repeated quote id.
    async fn add_zero_ex_order(&self, order: &ZeroExOrder) -> Result<()>;

    /// Most recently recorded hedge orders first
    async fn list_exchange_orders(&self, limit: u32) -> Result<Vec<ExchangeOrder>>;

    /// Look up a 0x order by quote id
    async fn find_zero_ex_order(&self, quote_id: &str) -> Result<ZeroExOrder>;
}
