//! Common types used across the dealer workspace
//!
//! This module provides the domain types shared by the cache, the order
//! history database and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Separator between base and quote tickers in a market symbol
pub const PAIR_SEPARATOR: char = '/';

/// Parse and validate a quote identifier
///
/// Quote identifiers are UUID strings assigned by the quote producer.
pub fn parse_quote_id(quote_id: &str) -> Result<Uuid> {
    Uuid::parse_str(quote_id).map_err(|_| Error::InvalidQuoteId(quote_id.to_string()))
}

/// Convert a UTC timestamp to floating-point seconds since the epoch
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order (a bid)
    #[serde(alias = "bid")]
    Buy,
    /// Sell order (an ask)
    #[serde(alias = "ask")]
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "buy" | "bid" => Ok(Side::Buy),
            "sell" | "ask" => Ok(Side::Sell),
            other => Err(Error::invalid_input(format!("unknown side: {}", other))),
        }
    }
}

/// Single ticker symbol (e.g., "BTC"), always upper-case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol (converted to uppercase)
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Market symbol made of a base and a quote ticker (e.g., "BTC/USD")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    /// Base asset (e.g., BTC in BTC/USD)
    pub base: Symbol,
    /// Quote asset (e.g., USD in BTC/USD)
    pub quote: Symbol,
}

impl TradingPair {
    /// Create a new trading pair
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: Symbol::new(base),
            quote: Symbol::new(quote),
        }
    }

    /// Parse a `BASE/QUOTE` symbol
    ///
    /// The symbol must contain exactly one separator splitting two
    /// non-empty tickers.
    pub fn parse(symbol: &str) -> Result<Self> {
        let parts: Vec<&str> = symbol.split(PAIR_SEPARATOR).collect();
        match parts.as_slice() {
            [base, quote] if !base.is_empty() && !quote.is_empty() => {
                Ok(Self::new(*base, *quote))
            }
            _ => Err(Error::InvalidSymbol(symbol.to_string())),
        }
    }

    /// Get the pair as a string (e.g., "BTC/USD")
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl std::str::FromStr for TradingPair {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TradingPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.base, PAIR_SEPARATOR, self.quote)
    }
}

/// Lifecycle status of an order mark
///
/// Stored on the wire as its integer code so that other writers of the
/// same store can read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QuoteStatus {
    /// Quote generated and sent to the taker
    #[default]
    Generated = 0,
    /// Validated and submitted for settlement
    Submitted = 1,
    /// Filled, sent to the hedger
    Filled = 2,
}

impl QuoteStatus {
    /// Integer status code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Generated => "generated",
            QuoteStatus::Submitted => "submitted",
            QuoteStatus::Filled => "filled",
        }
    }
}

impl TryFrom<u8> for QuoteStatus {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(QuoteStatus::Generated),
            1 => Ok(QuoteStatus::Submitted),
            2 => Ok(QuoteStatus::Filled),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

impl From<QuoteStatus> for u8 {
    fn from(status: QuoteStatus) -> Self {
        status.code()
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = Error;

    /// Accepts either the status name or its integer code
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "generated" => Ok(QuoteStatus::Generated),
            "submitted" => Ok(QuoteStatus::Submitted),
            "filled" => Ok(QuoteStatus::Filled),
            other => other
                .parse::<u8>()
                .map_err(|_| Error::InvalidStatus(other.to_string()))
                .and_then(QuoteStatus::try_from),
        }
    }
}

/// A single price level on one side of an order book
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
}

impl PriceLevel {
    pub fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }
}

/// A price quote issued by the dealer
///
/// Only `expiration` is interpreted by the cache. Every other field the
/// quote producer attaches is carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    /// Expiration time in seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<f64>,

    /// Producer-defined quote fields (sizes, prices, order hash, ...)
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Quote {
    /// Create a quote expiring at the given epoch time
    pub fn new(expiration: f64) -> Self {
        Self {
            expiration: Some(expiration),
            fields: Map::new(),
        }
    }

    /// Attach a producer-defined field
    ///
    /// `expiration` sets the typed expiration instead; a non-numeric value
    /// clears it.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if key == "expiration" {
            self.expiration = value.as_f64();
        } else {
            self.fields.insert(key, value);
        }
        self
    }

    /// Whether the quote has expired at `now` (epoch seconds)
    ///
    /// Returns `None` when the quote carries no expiration.
    pub fn is_expired_at(&self, now: f64) -> Option<bool> {
        self.expiration.map(|expiration| expiration <= now)
    }
}

/// A stored quote together with its lifecycle status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMark {
    pub status: QuoteStatus,
    pub quote: Quote,
}

impl OrderMark {
    pub fn new(quote: Quote) -> Self {
        Self {
            status: QuoteStatus::Generated,
            quote,
        }
    }

    pub fn with_status(quote: Quote, status: QuoteStatus) -> Self {
        Self { status, quote }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_trading_pair_parse() {
        let pair = TradingPair::parse("btc/usd").unwrap();
        assert_eq!(pair.base.as_str(), "BTC");
        assert_eq!(pair.quote.as_str(), "USD");
        assert_eq!(pair.as_string(), "BTC/USD");
    }

    #[test]
    fn test_trading_pair_rejects_bad_shapes() {
        for bad in ["BTCUSD", "BTC/USD/EUR", "/USD", "BTC/", "/", ""] {
            assert_matches!(TradingPair::parse(bad), Err(Error::InvalidSymbol(_)));
        }
    }

    #[test]
    fn test_quote_id_validation() {
        assert!(parse_quote_id("a3bb189e-8bf9-3888-9912-ace4e6543002").is_ok());
        assert!(parse_quote_id(&Uuid::new_v4().to_string()).is_ok());
        assert_matches!(parse_quote_id("not-a-uuid"), Err(Error::InvalidQuoteId(_)));
    }

    #[test]
    fn test_quote_status_codes() {
        assert_eq!(QuoteStatus::default(), QuoteStatus::Generated);
        assert_eq!(QuoteStatus::Filled.code(), 2);
        assert_eq!(QuoteStatus::try_from(1).unwrap(), QuoteStatus::Submitted);
        assert!(QuoteStatus::try_from(3).is_err());
        assert_eq!("submitted".parse::<QuoteStatus>().unwrap(), QuoteStatus::Submitted);
        assert_eq!("2".parse::<QuoteStatus>().unwrap(), QuoteStatus::Filled);
        assert!("cancelled".parse::<QuoteStatus>().is_err());
    }

    #[test]
    fn test_quote_status_serializes_as_code() {
        assert_eq!(serde_json::to_value(QuoteStatus::Submitted).unwrap(), json!(1));
        let status: QuoteStatus = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(status, QuoteStatus::Filled);
        assert!(serde_json::from_value::<QuoteStatus>(json!(7)).is_err());
    }

    #[test]
    fn test_quote_keeps_producer_fields() {
        let raw = json!({
            "expiration": 1700000060,
            "makerAssetSize": "1.5",
            "order": { "salt": "42" }
        });
        let quote: Quote = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(quote.expiration, Some(1_700_000_060.0));
        assert_eq!(quote.fields["order"]["salt"], json!("42"));
        assert!(quote.fields.get("expiration").is_none());

        assert_eq!(quote.is_expired_at(1_700_000_059.0), Some(false));
        assert_eq!(quote.is_expired_at(1_700_000_060.0), Some(true));
        assert_eq!(Quote::default().is_expired_at(0.0), None);
    }

    #[test]
    fn test_with_field_sets_typed_expiration() {
        let quote = Quote::default()
            .with_field("expiration", 1_700_000_060)
            .with_field("salt", "42");
        assert_eq!(quote.expiration, Some(1_700_000_060.0));
        assert!(quote.fields.get("expiration").is_none());

        let decoded: Quote = serde_json::from_value(serde_json::to_value(&quote).unwrap()).unwrap();
        assert_eq!(decoded, quote);

        let cleared = Quote::new(1.0).with_field("expiration", "soon");
        assert_eq!(cleared.expiration, None);
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("bid".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("SELL".parse::<Side>().unwrap(), Side::Sell);
        assert!("hold".parse::<Side>().is_err());
    }

    #[test]
    fn test_epoch_seconds() {
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 500_000_000).unwrap();
        assert_eq!(epoch_seconds(at), 1_700_000_000.5);
    }
}
