//! Payload encoding
//!
//! Order marks are stored as a versioned JSON envelope:
//!
//! ```text
//! {"v": 1, "status": 0, "quote": {"expiration": 1700000060, ...}}
//! ```
//!
//! Records without `v` are read as version 1 so that older producers
//! sharing the store stay readable. Order books are a JSON list of
//! `{price, size}` levels; numeric scalars (timestamps, positions) are
//! plain decimal strings.

use common::{OrderMark, PriceLevel, Quote, QuoteStatus};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Current order mark schema version
pub const SCHEMA_VERSION: u64 = 1;

/// Errors raised while encoding or decoding stored payloads
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unsupported schema version {0}")]
    UnsupportedVersion(u64),

    #[error("not a number: {0:?}")]
    NotNumeric(String),
}

#[derive(Serialize)]
struct Envelope<'a> {
    v: u64,
    status: QuoteStatus,
    quote: &'a Quote,
}

/// Encode an order mark into its stored representation
pub fn encode_order_mark(mark: &OrderMark) -> Result<Vec<u8>, CodecError> {
    let envelope = Envelope {
        v: SCHEMA_VERSION,
        status: mark.status,
        quote: &mark.quote,
    };
    serde_json::to_vec(&envelope).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Decode a stored order mark
///
/// A record without a `status` field is reported as
/// [`CodecError::MissingField`], never defaulted.
pub fn decode_order_mark(bytes: &[u8]) -> Result<OrderMark, CodecError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))?;
    let Value::Object(mut record) = value else {
        return Err(CodecError::Malformed("order mark is not an object".to_string()));
    };

    match record.get("v") {
        None => {}
        Some(v) => match v.as_u64() {
            Some(SCHEMA_VERSION) => {}
            Some(other) => return Err(CodecError::UnsupportedVersion(other)),
            None => {
                return Err(CodecError::InvalidField {
                    field: "v",
                    reason: v.to_string(),
                })
            }
        },
    }

    let status = record.remove("status").ok_or(CodecError::MissingField("status"))?;
    let status: QuoteStatus =
        serde_json::from_value(status).map_err(|e| CodecError::InvalidField {
            field: "status",
            reason: e.to_string(),
        })?;

    let quote = record.remove("quote").ok_or(CodecError::MissingField("quote"))?;
    let quote: Quote = serde_json::from_value(quote).map_err(|e| CodecError::InvalidField {
        field: "quote",
        reason: e.to_string(),
    })?;

    Ok(OrderMark { status, quote })
}

/// Encode one side of an order book
pub fn encode_order_book(levels: &[PriceLevel]) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(levels).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Decode one side of an order book
pub fn decode_order_book(bytes: &[u8]) -> Result<Vec<PriceLevel>, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Encode a float the way other writers of the store do (decimal string)
pub fn encode_float(value: f64) -> Vec<u8> {
    value.to_string().into_bytes()
}

/// Decode a decimal string into a float
pub fn decode_float(bytes: &[u8]) -> Result<f64, CodecError> {
    let text = String::from_utf8_lossy(bytes);
    text.trim()
        .parse::<f64>()
        .map_err(|_| CodecError::NotNumeric(text.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn sample_mark() -> OrderMark {
        OrderMark::with_status(
            Quote::new(1_700_000_060.0)
                .with_field("makerAssetSize", "1.5")
                .with_field("order", json!({ "salt": "42", "feeRecipient": "0xabc" })),
            QuoteStatus::Submitted,
        )
    }

    #[test]
    fn test_envelope_shape() {
        let bytes = encode_order_mark(&sample_mark()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["v"], json!(1));
        assert_eq!(value["status"], json!(1));
        assert_eq!(value["quote"]["expiration"], json!(1_700_000_060.0));
        assert_eq!(value["quote"]["order"]["salt"], json!("42"));
    }

    #[test]
    fn test_nested_fields_survive() {
        let mark = sample_mark();
        let decoded = decode_order_mark(&encode_order_mark(&mark).unwrap()).unwrap();
        assert_eq!(decoded, mark);
    }

    #[test]
    fn test_unversioned_record_is_read_as_v1() {
        let raw = br#"{"status": 2, "quote": {"expiration": 10}}"#;
        let mark = decode_order_mark(raw).unwrap();
        assert_eq!(mark.status, QuoteStatus::Filled);
        assert_eq!(mark.quote.expiration, Some(10.0));
    }

    #[test]
    fn test_missing_status_is_reported() {
        let raw = br#"{"v": 1, "quote": {"expiration": 10}}"#;
        assert_matches!(decode_order_mark(raw), Err(CodecError::MissingField("status")));
    }

    #[test]
    fn test_bad_records() {
        assert_matches!(
            decode_order_mark(br#"{"status": 9, "quote": {}}"#),
            Err(CodecError::InvalidField { field: "status", .. })
        );
        assert_matches!(
            decode_order_mark(br#"{"v": 2, "status": 0, "quote": {}}"#),
            Err(CodecError::UnsupportedVersion(2))
        );
        assert_matches!(
            decode_order_mark(br#"{"status": 0}"#),
            Err(CodecError::MissingField("quote"))
        );
        assert_matches!(decode_order_mark(b"[1, 2]"), Err(CodecError::Malformed(_)));
        assert_matches!(decode_order_mark(b"\x78\x9c"), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn test_order_book_levels() {
        let levels = vec![PriceLevel::new(30_000.5, 1.25), PriceLevel::new(29_999.0, 3.0)];
        let bytes = encode_order_book(&levels).unwrap();
        assert_eq!(decode_order_book(&bytes).unwrap(), levels);
        assert_matches!(decode_order_book(b"{}"), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn test_floats() {
        assert_eq!(decode_float(&encode_float(-2.5)).unwrap(), -2.5);
        assert_eq!(decode_float(b"1.0").unwrap(), 1.0);
        assert_eq!(decode_float(b"1700000000.123").unwrap(), 1_700_000_000.123);
        assert_matches!(decode_float(b"lots"), Err(CodecError::NotNumeric(s)) if s == "lots");
    }
}
