//! dealerctl
//!
//! Operator tool for the dealer cache: inspect and adjust quotes,
//! positions and order books in the shared store, browse the order
//! history database, and manage configuration files.

use anyhow::{bail, Context, Result};
use cli::{
    BookCommands, Cli, Commands, ConfigCommands, HistoryCommands, PositionCommands, QuoteCommands,
};
use config::{generate_default_config, load_config, save_config, validate_config, DealerConfig};
use dealer_cache::{create_store_from_config, DealerCache, SharedStore};
use observability::{init_logging, LogFormat};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use storage::{MySqlOrderHistory, OrderHistoryStore};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Config(command) => {
            init_logging("dealerctl", LogFormat::Compact, "warn")?;
            debug!(?command, "Executing 'config' command");
            config_command(command)
        }
        command => {
            let config = resolve_config(cli.config.as_deref(), cli.redis_host)?;
            let format = LogFormat::parse(&config.logging.format).unwrap_or_default();
            init_logging("dealerctl", format, &config.logging.level)?;
            debug!(?command, "CLI arguments parsed");

            match command {
                Commands::Quotes(command) => quotes_command(&config, command).await,
                Commands::Position(command) => position_command(&config, command).await,
                Commands::Book(command) => book_command(&config, command).await,
                Commands::History(command) => history_command(&config, command).await,
                Commands::Config(command) => config_command(command),
            }
        }
    }
}

/// Load the config file if one was given, else read the environment
fn resolve_config(path: Option<&Path>, redis_host: Option<String>) -> Result<DealerConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => DealerConfig::from_env()?,
    };

    if let Some(host) = redis_host {
        config.redis.host = host;
    }

    let report = validate_config(&config);
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message);
    }
    if !report.is_valid() {
        for err in &report.errors {
            eprintln!("  [error] {}", err);
        }
        bail!("Configuration validation failed");
    }

    Ok(config)
}

async fn open_cache(config: &DealerConfig) -> Result<DealerCache<SharedStore>> {
    let store = create_store_from_config(config)
        .await
        .with_context(|| format!("Failed to connect to {}:{}", config.redis.host, config.redis.port))?;
    Ok(DealerCache::new(store).with_max_update_retries(config.cache.max_update_retries))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

async fn quotes_command(config: &DealerConfig, command: QuoteCommands) -> Result<()> {
    let cache = open_cache(config).await?;

    match command {
        QuoteCommands::List { all } => {
            let marks: BTreeMap<_, _> = cache
                .get_all_order_marks(!all)
                .await
                .context("Failed to list order marks")?
                .into_iter()
                .collect();
            info!(count = marks.len(), "Listed order marks");
            print_json(&marks)
        }
        QuoteCommands::Get { quote_id } => {
            let mark = cache
                .get_order_mark(&quote_id)
                .await
                .with_context(|| format!("Failed to read quote {}", quote_id))?;
            print_json(&mark)
        }
        QuoteCommands::Status { quote_id, status } => {
            cache
                .update_quote_status(&quote_id, status)
                .await
                .with_context(|| format!("Failed to set status of quote {}", quote_id))?;
            info!(%quote_id, %status, "Quote status updated");
            print_json(&json!({ "quote_id": quote_id, "status": status.as_str() }))
        }
        QuoteCommands::Remove { quote_id } => {
            cache
                .remove_order_mark(&quote_id)
                .await
                .with_context(|| format!("Failed to remove quote {}", quote_id))?;
            print_json(&json!({ "removed": quote_id }))
        }
    }
}

async fn position_command(config: &DealerConfig, command: PositionCommands) -> Result<()> {
    let cache = open_cache(config).await?;

    let (symbol, size) = match command {
        PositionCommands::Get { symbol } => {
            let size = cache
                .get_unhedged_position(&symbol)
                .await
                .with_context(|| format!("Failed to read position for {}", symbol))?;
            (symbol, size)
        }
        PositionCommands::Set { symbol, size } => {
            cache
                .set_unhedged_position(&symbol, size)
                .await
                .with_context(|| format!("Failed to set position for {}", symbol))?;
            info!(%symbol, size, "Unhedged position set");
            (symbol, size)
        }
    };

    print_json(&json!({ "symbol": symbol.to_uppercase(), "size": size }))
}

async fn book_command(config: &DealerConfig, command: BookCommands) -> Result<()> {
    let cache = open_cache(config).await?;

    match command {
        BookCommands::Get {
            exchange,
            symbol,
            side,
            max_age,
        } => {
            let secs = max_age.unwrap_or(config.cache.default_max_age_seconds);
            let max_age = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("Invalid max age: {}", secs))?;

            let levels = cache
                .get_order_book(&exchange, &symbol, &side, max_age)
                .await
                .with_context(|| format!("Failed to read {} {} book on {}", symbol, side, exchange))?;
            print_json(&levels)
        }
    }
}

async fn history_command(config: &DealerConfig, command: HistoryCommands) -> Result<()> {
    let Some(database) = config.database.as_ref() else {
        bail!("No 'database' section in the configuration");
    };
    let history = MySqlOrderHistory::connect(database)
        .await
        .context("Failed to connect to the order history database")?;

    match command {
        HistoryCommands::Orders { limit } => {
            let orders = history
                .list_exchange_orders(limit)
                .await
                .context("Failed to list hedge orders")?;
            print_json(&orders)
        }
        HistoryCommands::Quote { quote_id } => {
            let order = history
                .find_zero_ex_order(&quote_id)
                .await
                .with_context(|| format!("Failed to find 0x order {}", quote_id))?;
            print_json(&order)
        }
    }
}

fn config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Init { output } => init_command(&output),
        ConfigCommands::Validate { config } => validate_command(&config),
    }
}

fn validate_command(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Redis: {}:{} (db {})", config.redis.host, config.redis.port, config.redis.db_index);
    println!("Store: {}", config.cache.store);
    println!(
        "Order history: {}",
        config
            .database
            .as_ref()
            .map_or("disabled".to_string(), |db| format!("{}/{}", db.host, db.database))
    );

    Ok(())
}

fn init_command(output_path: &Path) -> Result<()> {
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created at {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Set DEALER_REDIS_PASSWORD or edit the redis section");
    println!("  2. Add a 'database' section to enable the order history commands");
    println!("  3. Run 'dealerctl config validate --config {:?}'", output_path);

    Ok(())
}
