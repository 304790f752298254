//! In-memory order history for tests and local runs

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::records::{ExchangeOrder, ZeroExOrder};
use crate::store::traits::OrderHistoryStore;
use crate::{Result, StorageError};

#[derive(Default)]
pub struct InMemoryOrderHistory {
    exchange_orders: RwLock<Vec<ExchangeOrder>>,
    zero_ex_orders: RwLock<HashMap<String, ZeroExOrder>>,
}

impl InMemoryOrderHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderHistoryStore for InMemoryOrderHistory {
    async fn init_tables(&self) -> Result<()> {
        Ok(())
    }

    async fn add_exchange_order(&self, order: &ExchangeOrder) -> Result<()> {
        order.validate()?;
        let mut orders = self.exchange_orders.write();
        if orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(StorageError::Duplicate(order.order_id.clone()));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn add_zero_ex_order(&self, order: &ZeroExOrder) -> Result<()> {
        order.validate()?;
        let mut orders = self.zero_ex_orders.write();
        if orders.contains_key(&order.quote_id) {
            return Err(StorageError::Duplicate(order.quote_id.clone()));
        }
        orders.insert(order.quote_id.clone(), order.clone());
        Ok(())
    }

    async fn list_exchange_orders(&self, limit: u32) -> Result<Vec<ExchangeOrder>> {
        Ok(self
            .exchange_orders
            .read()
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_zero_ex_order(&self, quote_id: &str) -> Result<ZeroExOrder> {
        self.zero_ex_orders
            .read()
            .get(quote_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(quote_id.to_string()))
    }
}
