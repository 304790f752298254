//! Dealer cache operations
//!
//! [`DealerCache`] is stateless apart from its injected store and clock:
//! every call is a direct request to the shared store, so one instance can
//! be shared across tasks behind an `Arc`.

use std::collections::HashMap;
use std::time::Duration;

use common::{epoch_seconds, parse_quote_id, OrderMark, PriceLevel, Quote, QuoteStatus, TradingPair};
use tracing::{debug, instrument};

use crate::clock::{Clock, SystemClock};
use crate::codec::{self, CodecError};
use crate::error::{DealerCacheError, Result};
use crate::keys::{position_field, OrderBookKey, ORDER_MARKS_KEY, UNHEDGED_POSITION_KEY};
use crate::metrics::observe;
use crate::store::{CasOutcome, KeyValueStore, RedisStore};

/// Default number of compare-and-set attempts for a status update
pub const DEFAULT_MAX_UPDATE_RETRIES: u32 = 16;

/// Cache of dealer quotes, order books and unhedged positions
pub struct DealerCache<S, C = SystemClock> {
    store: S,
    clock: C,
    max_update_retries: u32,
}

impl<S: KeyValueStore> DealerCache<S, SystemClock> {
    /// Create a cache over `store` using wall-clock time
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl DealerCache<RedisStore, SystemClock> {
    /// Connect to Redis and apply the cache settings from `config`
    pub async fn connect(config: &config::DealerConfig) -> Result<Self> {
        let store = RedisStore::new(&config.redis).await?;
        Ok(Self::new(store).with_max_update_retries(config.cache.max_update_retries))
    }
}

impl<S: KeyValueStore, C: Clock> DealerCache<S, C> {
    /// Create a cache with an explicit time source
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            max_update_retries: DEFAULT_MAX_UPDATE_RETRIES,
        }
    }

    /// Bound the compare-and-set attempts of `update_quote_status`
    pub fn with_max_update_retries(mut self, retries: u32) -> Self {
        self.max_update_retries = retries.max(1);
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn now_secs(&self) -> f64 {
        epoch_seconds(self.clock.now())
    }

    // ------------------------------------------------------------------------
    // Unhedged positions
    // ------------------------------------------------------------------------

    /// Set the per-symbol unhedged position
    #[instrument(level = "debug", skip(self))]
    pub async fn set_unhedged_position(&self, symbol: &str, size: f64) -> Result<()> {
        observe("set_unhedged_position", async {
            let field = position_field(symbol);
            self.store
                .hset(UNHEDGED_POSITION_KEY, &field, &codec::encode_float(size))
                .await?;
            debug!(symbol = %field, size, "Unhedged position set");
            Ok(())
        })
        .await
    }

    /// Get the per-symbol unhedged position, `0.0` when none is stored
    #[instrument(level = "debug", skip(self))]
    pub async fn get_unhedged_position(&self, symbol: &str) -> Result<f64> {
        observe("get_unhedged_position", async {
            let field = position_field(symbol);
            match self.store.hget(UNHEDGED_POSITION_KEY, &field).await? {
                None => Ok(0.0),
                Some(raw) => codec::decode_float(&raw).map_err(DealerCacheError::corruption(
                    format!("{}[{}]", UNHEDGED_POSITION_KEY, field),
                )),
            }
        })
        .await
    }

    // ------------------------------------------------------------------------
    // Order books
    // ------------------------------------------------------------------------

    /// Fetch one side of an order book no older than `max_age`
    ///
    /// A zero `max_age` skips the age check and returns whatever snapshot
    /// was written last.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_order_book(
        &self,
        exchange: &str,
        symbol: &str,
        side: &str,
        max_age: Duration,
    ) -> Result<Vec<PriceLevel>> {
        observe("get_order_book", async {
            let now = self.now_secs();
            let pair = TradingPair::parse(symbol)?;
            let key = OrderBookKey::new(exchange, &pair, side);

            let raw_timestamp = self
                .store
                .get(&key.timestamp)
                .await?
                .ok_or_else(|| DealerCacheError::OrderBookNotFound(key.book.clone()))?;
            let written_at = codec::decode_float(&raw_timestamp)
                .map_err(DealerCacheError::corruption(key.timestamp.as_str()))?;

            let age_secs = now - written_at;
            let max_age_secs = max_age.as_secs_f64();
            if !max_age.is_zero() && age_secs >= max_age_secs {
                return Err(DealerCacheError::StaleData {
                    key: key.book,
                    age_secs,
                    overage_secs: age_secs - max_age_secs,
                });
            }

            let raw_book = self
                .store
                .get(&key.book)
                .await?
                .ok_or_else(|| DealerCacheError::OrderBookNotFound(key.book.clone()))?;
            let levels = codec::decode_order_book(&raw_book)
                .map_err(DealerCacheError::corruption(key.book.as_str()))?;

            debug!(key = %key.book, age_secs, levels = levels.len(), "Order book read");
            Ok(levels)
        })
        .await
    }

    /// Publish one side of an order book, stamped with the current time
    ///
    /// Writes the payload before the timestamp, so a reader that sees the
    /// new timestamp also sees the new payload.
    #[instrument(level = "debug", skip(self, levels))]
    pub async fn set_order_book(
        &self,
        exchange: &str,
        symbol: &str,
        side: &str,
        levels: &[PriceLevel],
    ) -> Result<()> {
        observe("set_order_book", async {
            let pair = TradingPair::parse(symbol)?;
            let key = OrderBookKey::new(exchange, &pair, side);
            let payload = codec::encode_order_book(levels)
                .map_err(DealerCacheError::corruption(key.book.as_str()))?;

            self.store.set(&key.book, &payload).await?;
            self.store
                .set(&key.timestamp, &codec::encode_float(self.now_secs()))
                .await?;
            debug!(key = %key.book, levels = levels.len(), "Order book written");
            Ok(())
        })
        .await
    }

    // ------------------------------------------------------------------------
    // Order marks
    // ------------------------------------------------------------------------

    /// Store a quote under its id with the given status
    ///
    /// Overwrites any existing order mark for the id.
    #[instrument(level = "debug", skip(self, quote))]
    pub async fn set_quote(&self, quote_id: &str, quote: &Quote, status: QuoteStatus) -> Result<()> {
        observe("set_quote", async {
            parse_quote_id(quote_id)?;
            let mark = OrderMark::with_status(quote.clone(), status);
            let encoded =
                codec::encode_order_mark(&mark).map_err(DealerCacheError::corruption(quote_id))?;
            self.store.hset(ORDER_MARKS_KEY, quote_id, &encoded).await?;
            debug!(quote_id, %status, "Order mark stored");
            Ok(())
        })
        .await
    }

    /// Store a freshly generated quote
    pub async fn add_quote(&self, quote_id: &str, quote: &Quote) -> Result<()> {
        self.set_quote(quote_id, quote, QuoteStatus::Generated).await
    }

    /// Change the status of an existing order mark
    ///
    /// The new record is written with a compare-and-set against the exact
    /// bytes that were read, so a concurrent update is never silently
    /// overwritten: on mismatch the record is re-read and the update
    /// retried.
    #[instrument(level = "debug", skip(self))]
    pub async fn update_quote_status(&self, quote_id: &str, new_status: QuoteStatus) -> Result<()> {
        observe("update_quote_status", async {
            parse_quote_id(quote_id)?;

            for attempt in 1..=self.max_update_retries {
                let current = self
                    .store
                    .hget(ORDER_MARKS_KEY, quote_id)
                    .await?
                    .ok_or_else(|| DealerCacheError::QuoteNotFound(quote_id.to_string()))?;

                let mut mark = codec::decode_order_mark(&current)
                    .map_err(DealerCacheError::corruption(quote_id))?;
                mark.status = new_status;
                let updated = codec::encode_order_mark(&mark)
                    .map_err(DealerCacheError::corruption(quote_id))?;

                match self
                    .store
                    .hcompare_and_set(ORDER_MARKS_KEY, quote_id, &current, &updated)
                    .await?
                {
                    CasOutcome::Swapped => {
                        debug!(quote_id, %new_status, attempt, "Quote status updated");
                        return Ok(());
                    }
                    CasOutcome::Missing => {
                        return Err(DealerCacheError::QuoteNotFound(quote_id.to_string()));
                    }
                    CasOutcome::Mismatch => {
                        debug!(quote_id, attempt, "Order mark changed concurrently, retrying");
                    }
                }
            }

            Err(DealerCacheError::UpdateConflict {
                quote_id: quote_id.to_string(),
                attempts: self.max_update_retries,
            })
        })
        .await
    }

    /// Fetch the quote stored under `quote_id` (without its status)
    #[instrument(level = "debug", skip(self))]
    pub async fn get_quote(&self, quote_id: &str) -> Result<Quote> {
        Ok(self.get_order_mark(quote_id).await?.quote)
    }

    /// Fetch the full order mark (quote and status) for `quote_id`
    #[instrument(level = "debug", skip(self))]
    pub async fn get_order_mark(&self, quote_id: &str) -> Result<OrderMark> {
        observe("get_order_mark", async {
            parse_quote_id(quote_id)?;
            let raw = self
                .store
                .hget(ORDER_MARKS_KEY, quote_id)
                .await?
                .ok_or_else(|| DealerCacheError::QuoteNotFound(quote_id.to_string()))?;
            codec::decode_order_mark(&raw).map_err(DealerCacheError::corruption(quote_id))
        })
        .await
    }

    /// Fetch every order mark keyed by quote id
    ///
    /// With `only_valid`, marks whose quote expired at or before the time
    /// of the call are left out. The clock is read once per call.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_all_order_marks(&self, only_valid: bool) -> Result<HashMap<String, OrderMark>> {
        observe("get_all_order_marks", async {
            let now = self.now_secs();
            let raw_marks = self.store.hgetall(ORDER_MARKS_KEY).await?;
            let total = raw_marks.len();

            let mut marks = HashMap::with_capacity(total);
            for (quote_id, raw) in raw_marks {
                let mark = codec::decode_order_mark(&raw)
                    .map_err(DealerCacheError::corruption(quote_id.as_str()))?;

                if only_valid {
                    match mark.quote.is_expired_at(now) {
                        Some(true) => continue,
                        Some(false) => {}
                        None => {
                            return Err(DealerCacheError::DataCorruption {
                                key: quote_id,
                                source: CodecError::MissingField("expiration"),
                            })
                        }
                    }
                }

                marks.insert(quote_id, mark);
            }

            debug!(total, returned = marks.len(), only_valid, "Order marks read");
            Ok(marks)
        })
        .await
    }

    /// Remove an order mark; removing an absent mark is not an error
    #[instrument(level = "debug", skip(self))]
    pub async fn remove_order_mark(&self, quote_id: &str) -> Result<()> {
        observe("remove_order_mark", async {
            parse_quote_id(quote_id)?;
            let removed = self.store.hdel(ORDER_MARKS_KEY, quote_id).await?;
            debug!(quote_id, removed, "Order mark removed");
            Ok(())
        })
        .await
    }

    /// List the ids of all stored order marks, in store order
    #[instrument(level = "debug", skip(self))]
    pub async fn get_quote_ids(&self) -> Result<Vec<String>> {
        observe("get_quote_ids", async {
            Ok(self.store.hkeys(ORDER_MARKS_KEY).await?)
        })
        .await
    }

    /// Check that the store is reachable
    pub async fn ping(&self) -> Result<()> {
        Ok(self.store.ping().await?)
    }
}
