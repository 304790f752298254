//! MySQL order history
//!
//! Shares the `dealer_db` tables with the other dealer services, so the
//! column layout is fixed: an auto-increment `id`, a NOT NULL record key and
//! nullable VARCHAR value columns. Record keys carry no unique index; inserts
//! skip keys that are already present.

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::{debug, info, instrument};

use crate::records::{ExchangeOrder, ZeroExOrder};
use crate::store::traits::OrderHistoryStore;
use crate::{Result, StorageError};

pub const EXCHANGE_ORDER_TABLE: &str = "exchange_order_history";
pub const ZERO_EX_ORDER_TABLE: &str = "zero_ex_order_history";

/// Column order of `exchange_order_history`, record key first
pub const EXCHANGE_ORDER_COLUMNS: [&str; 9] = [
    "order_id",
    "exchange",
    "pair",
    "side",
    "size",
    "price",
    "time_placed",
    "filled_size",
    "status",
];

/// Column order of `zero_ex_order_history`, record key first
pub const ZERO_EX_ORDER_COLUMNS: [&str; 9] = [
    "quote_id",
    "side",
    "pair",
    "size",
    "price",
    "expiration",
    "fee",
    "status",
    "transaction_id",
];

fn column_type(column: &str) -> &'static str {
    match column {
        // 0x transaction hash: 0x + 64 hex digits
        "transaction_id" => "VARCHAR(66) NULL",
        _ => "VARCHAR(45) NULL",
    }
}

fn create_table_sql(table: &str, columns: &[&str]) -> String {
    let mut definitions = vec!["`id` INT AUTO_INCREMENT PRIMARY KEY".to_string()];
    for (i, column) in columns.iter().enumerate() {
        let ty = if i == 0 {
            "VARCHAR(45) NOT NULL"
        } else {
            column_type(column)
        };
        definitions.push(format!("`{}` {}", column, ty));
    }
    format!("CREATE TABLE IF NOT EXISTS `{}` ({})", table, definitions.join(", "))
}

/// Insert one row unless a row with the same key (first column) exists
///
/// Binds every column value in order, then the key once more.
fn insert_unique_sql(table: &str, columns: &[&str]) -> String {
    let names = columns
        .iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO `{table}` ({names}) SELECT {placeholders} FROM DUAL \
         WHERE NOT EXISTS (SELECT 1 FROM `{table}` WHERE `{key}` = ?)",
        table = table,
        names = names,
        placeholders = placeholders,
        key = columns[0],
    )
}

fn exchange_order_values(order: &ExchangeOrder) -> [Option<&str>; 9] {
    [
        Some(order.order_id.as_str()),
        Some(order.exchange.as_str()),
        Some(order.pair.as_str()),
        Some(order.side.as_str()),
        Some(order.size.as_str()),
        Some(order.price.as_str()),
        Some(order.time_placed.as_str()),
        order.filled_size.as_deref(),
        order.status.as_deref(),
    ]
}

fn zero_ex_order_values(order: &ZeroExOrder) -> [Option<&str>; 9] {
    [
        Some(order.quote_id.as_str()),
        Some(order.side.as_str()),
        Some(order.pair.as_str()),
        Some(order.size.as_str()),
        Some(order.price.as_str()),
        Some(order.expiration.as_str()),
        Some(order.fee.as_str()),
        Some(order.status.as_str()),
        order.transaction_id.as_deref(),
    ]
}

/// Nullable VARCHAR read as a string, NULL as empty
fn text(row: &MySqlRow, column: &str) -> Result<String> {
    Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
}

fn row_to_exchange_order(row: &MySqlRow) -> Result<ExchangeOrder> {
    Ok(ExchangeOrder {
        order_id: text(row, "order_id")?,
        exchange: text(row, "exchange")?,
        pair: text(row, "pair")?,
        side: text(row, "side")?,
        size: text(row, "size")?,
        price: text(row, "price")?,
        time_placed: text(row, "time_placed")?,
        filled_size: row.try_get("filled_size")?,
        status: row.try_get("status")?,
    })
}

fn row_to_zero_ex_order(row: &MySqlRow) -> Result<ZeroExOrder> {
    Ok(ZeroExOrder {
        quote_id: text(row, "quote_id")?,
        side: text(row, "side")?,
        pair: text(row, "pair")?,
        size: text(row, "size")?,
        price: text(row, "price")?,
        expiration: text(row, "expiration")?,
        fee: text(row, "fee")?,
        status: text(row, "status")?,
        transaction_id: row.try_get("transaction_id")?,
    })
}

#[derive(Debug)]
pub struct MySqlOrderHistory {
    pool: MySqlPool,
}

impl MySqlOrderHistory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Open a pool against the configured database
    pub async fn connect(config: &config::DatabaseConfig) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(StorageError::Config("max_connections must be positive".to_string()));
        }
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_url())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        info!(host = %config.host, database = %config.database, "Connected to order history database");
        Ok(Self::new(pool))
    }

    async fn insert_unique(&self, table: &str, columns: &[&str], values: &[Option<&str>]) -> Result<()> {
        let sql = insert_unique_sql(table, columns);
        let mut query = sqlx::query(&sql);
        for value in values {
            query = query.bind(*value);
        }
        let key = values.first().copied().flatten().unwrap_or_default();
        let inserted = query.bind(key).execute(&self.pool).await?.rows_affected();

        if inserted == 0 {
            return Err(StorageError::Duplicate(key.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderHistoryStore for MySqlOrderHistory {
    #[instrument(skip(self))]
    async fn init_tables(&self) -> Result<()> {
        sqlx::query(&create_table_sql(EXCHANGE_ORDER_TABLE, &EXCHANGE_ORDER_COLUMNS))
            .execute(&self.pool)
            .await?;
        sqlx::query(&create_table_sql(ZERO_EX_ORDER_TABLE, &ZERO_EX_ORDER_COLUMNS))
            .execute(&self.pool)
            .await?;

        debug!("Order history tables ready");
        Ok(())
    }

    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn add_exchange_order(&self, order: &ExchangeOrder) -> Result<()> {
        order.validate()?;
        self.insert_unique(
            EXCHANGE_ORDER_TABLE,
            &EXCHANGE_ORDER_COLUMNS,
            &exchange_order_values(order),
        )
        .await
    }

    #[instrument(skip(self, order), fields(quote_id = %order.quote_id))]
    async fn add_zero_ex_order(&self, order: &ZeroExOrder) -> Result<()> {
        order.validate()?;
        self.insert_unique(
            ZERO_EX_ORDER_TABLE,
            &ZERO_EX_ORDER_COLUMNS,
            &zero_ex_order_values(order),
        )
        .await
    }

    async fn list_exchange_orders(&self, limit: u32) -> Result<Vec<ExchangeOrder>> {
        let rows = sqlx::query(&format!(
            "SELECT * FROM `{}` ORDER BY `id` DESC LIMIT ?",
            EXCHANGE_ORDER_TABLE
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_exchange_order).collect()
    }

    async fn find_zero_ex_order(&self, quote_id: &str) -> Result<ZeroExOrder> {
        let row = sqlx::query(&format!(
            "SELECT * FROM `{}` WHERE `quote_id` = ? ORDER BY `id` DESC LIMIT 1",
            ZERO_EX_ORDER_TABLE
        ))
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_zero_ex_order(&row),
            None => Err(StorageError::NotFound(quote_id.to_string())),
        }
    }
}
