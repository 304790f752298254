use clap::{Parser, Subcommand};
use common::QuoteStatus;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dealerctl")]
#[command(about = "Inspect and operate the dealer cache")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Path to the configuration file (DEALER_REDIS_* variables when omitted)
    #[arg(short, long, env = "DEALER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the Redis host from the configuration
    #[arg(long)]
    pub redis_host: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Order marks (quotes and their status)
    #[command(subcommand)]
    Quotes(QuoteCommands),

    /// Unhedged positions
    #[command(subcommand)]
    Position(PositionCommands),

    /// Order book snapshots
    #[command(subcommand)]
    Book(BookCommands),

    /// Order history database
    #[command(subcommand)]
    History(HistoryCommands),

    /// Configuration files
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum QuoteCommands {
    /// List order marks keyed by quote id
    List {
        /// Include expired quotes
        #[arg(long)]
        all: bool,
    },

    /// Show one order mark
    Get { quote_id: String },

    /// Set the status of an existing quote (generated, submitted, filled or 0-2)
    Status {
        quote_id: String,
        status: QuoteStatus,
    },

    /// Remove an order mark
    Remove { quote_id: String },
}

#[derive(Subcommand, Debug)]
pub enum PositionCommands {
    /// Show the unhedged position for a symbol
    Get { symbol: String },

    /// Overwrite the unhedged position for a symbol
    Set {
        symbol: String,
        #[arg(allow_negative_numbers = true)]
        size: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookCommands {
    /// Show one side of an order book
    Get {
        exchange: String,
        /// Trading pair, e.g. BTC/USDT
        symbol: String,
        /// bid or ask
        side: String,
        /// Freshness budget in seconds (0 disables the check)
        #[arg(long)]
        max_age: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// Most recent hedge orders
    Orders {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Look up a quoted 0x order
    Quote { quote_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration file with all defaults
    Init {
        #[arg(short, long, default_value = "dealer.yaml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        #[arg(short, long, default_value = "dealer.yaml")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quote_status() {
        let cli = Cli::try_parse_from([
            "dealerctl",
            "--config",
            "prod.yaml",
            "quotes",
            "status",
            "9f1c2d8e-3a4b-4c5d-8e9f-0a1b2c3d4e5f",
            "filled",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("prod.yaml")));
        match cli.command {
            Commands::Quotes(QuoteCommands::Status { status, .. }) => {
                assert_eq!(status, QuoteStatus::Filled)
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        let result = Cli::try_parse_from(["dealerctl", "quotes", "status", "id", "cancelled"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_position() {
        let cli = Cli::try_parse_from(["dealerctl", "position", "set", "weth", "-1.5"]).unwrap();
        match cli.command {
            Commands::Position(PositionCommands::Set { symbol, size }) => {
                assert_eq!(symbol, "weth");
                assert_eq!(size, -1.5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_book_max_age_optional() {
        let cli = Cli::try_parse_from(["dealerctl", "book", "get", "binance", "BTC/USDT", "bid"])
            .unwrap();
        match cli.command {
            Commands::Book(BookCommands::Get { max_age, .. }) => assert_eq!(max_age, None),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
