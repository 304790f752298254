//! Dealer Cache
//!
//! Shared-store cache for a dealer's trading components. It keeps:
//!
//! - order marks: outgoing price quotes and their lifecycle status
//! - order book snapshots per exchange, symbol and side, with a
//!   freshness budget enforced on read
//! - per-symbol unhedged positions
//!
//! All state lives in the key-value store (Redis in production); the
//! [`DealerCache`] itself is stateless and can be shared across tasks.
//!
//! # Example
//!
//! ```ignore
//! use dealer_cache::{DealerCache, RedisStore};
//! use common::{Quote, QuoteStatus};
//!
//! let store = RedisStore::new(&config.redis).await?;
//! let cache = DealerCache::new(store);
//!
//! cache.add_quote(&quote_id, &Quote::new(expiration)).await?;
//! cache.update_quote_status(&quote_id, QuoteStatus::Submitted).await?;
//! let book = cache.get_order_book("binance", "BTC/USD", "bid", max_age).await?;
//! ```

pub mod cache;
pub mod clock;
pub mod codec;
pub mod error;
pub mod keys;
pub mod metrics;
pub mod store;

pub use cache::{DealerCache, DEFAULT_MAX_UPDATE_RETRIES};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::CodecError;
pub use error::{DealerCacheError, Result};
pub use store::{
    create_store, create_store_from_config, CasOutcome, InMemoryStore, KeyValueStore, RedisStore,
    SharedStore, StoreError, StoreResult, StoreType,
};
