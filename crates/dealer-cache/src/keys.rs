//! Store key layout
//!
//! Other services read and write the same Redis instance, so these names
//! and shapes must not change.

use common::TradingPair;

/// Hash table of order marks (field = quote id)
pub const ORDER_MARKS_KEY: &str = "ORDER_MARKS";

/// Hash table of unhedged positions (field = upper-case symbol)
pub const UNHEDGED_POSITION_KEY: &str = "UNHEDGED_POSITION";

/// Suffix of the sibling key holding an order book's write time
pub const TIMESTAMP_SUFFIX: &str = "_timestamp";

/// Hash field for a symbol's unhedged position
pub fn position_field(symbol: &str) -> String {
    symbol.to_uppercase()
}

/// String keys for one side of one market on one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBookKey {
    /// `{SYMBOL}_{exchange}_{side}`
    pub book: String,
    /// `{SYMBOL}_{exchange}_{side}_timestamp`
    pub timestamp: String,
}

impl OrderBookKey {
    pub fn new(exchange: &str, pair: &TradingPair, side: &str) -> Self {
        let book = format!(
            "{}_{}_{}",
            pair.as_string(),
            exchange.to_lowercase(),
            side.to_lowercase()
        );
        let timestamp = format!("{}{}", book, TIMESTAMP_SUFFIX);
        Self { book, timestamp }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_book_key_normalizes_case() {
        let pair = TradingPair::parse("eth/usdc").unwrap();
        let key = OrderBookKey::new("Coinbase", &pair, "BID");
        assert_eq!(key.book, "ETH/USDC_coinbase_bid");
        assert_eq!(key.timestamp, "ETH/USDC_coinbase_bid_timestamp");
    }

    #[test]
    fn test_position_field() {
        assert_eq!(position_field("eth/usd"), "ETH/USD");
    }
}
