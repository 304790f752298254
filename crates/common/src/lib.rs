//! Common types and utilities for the dealer cache
//!
//! This crate provides the domain types shared by the cache, the order
//! history database and the operator CLI.
//!
//! # Modules
//!
//! - [`error`] - Validation error type
//! - [`types`] - Shared domain types (QuoteStatus, TradingPair, Quote, etc.)

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
