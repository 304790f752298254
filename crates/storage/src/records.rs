//! Order history records
//!
//! Column names and string typing follow the existing `dealer_db` tables:
//! every value column is a nullable VARCHAR(45), so numbers and timestamps
//! stay as the decimal strings the producers send.

use common::Side;
use serde::{Deserialize, Serialize};

use crate::{Result, StorageError};

/// An order the dealer placed on an external exchange to hedge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeOrder {
    /// Exchange-assigned order id
    pub order_id: String,
    pub exchange: String,
    /// Market symbol, `BASE/QUOTE`
    pub pair: String,
    pub side: String,
    pub size: String,
    pub price: String,
    /// Timestamp as reported by the exchange
    pub time_placed: String,
    #[serde(default)]
    pub filled_size: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A 0x order the dealer quoted to a taker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroExOrder {
    pub quote_id: String,
    pub side: String,
    pub pair: String,
    pub size: String,
    pub price: String,
    pub expiration: String,
    pub fee: String,
    pub status: String,
    /// Settlement transaction hash once filled
    pub transaction_id: Option<String>,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StorageError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

fn require_side(value: &str) -> Result<()> {
    value.parse::<Side>()?;
    Ok(())
}

impl ExchangeOrder {
    pub fn validate(&self) -> Result<()> {
        require("order_id", &self.order_id)?;
        require("exchange", &self.exchange)?;
        require("pair", &self.pair)?;
        require_side(&self.side)
    }
}

impl ZeroExOrder {
    pub fn validate(&self) -> Result<()> {
        require("quote_id", &self.quote_id)?;
        require("pair", &self.pair)?;
        require_side(&self.side)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_valid_records_pass() {
        assert!(exchange_order("o-1").validate().is_ok());
        assert!(zero_ex_order("q-1").validate().is_ok());
    }

    #[test]
    fn test_empty_id_rejected() {
        let order = exchange_order(" ");
        assert_matches!(order.validate(), Err(StorageError::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_side_rejected() {
        let mut order = zero_ex_order("q-1");
        order.side = "long".to_string();
        assert_matches!(order.validate(), Err(StorageError::InvalidInput(_)));
    }
}
