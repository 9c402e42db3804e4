//! Verba Core Library
//!
//! Shared functionality for the Verba personal finance tool:
//! - Natural-language command interpreter for Portuguese sentences
//! - Command dispatcher over a pluggable transaction store
//! - SQLite store and migrations
//! - Analytics: reports, trends, forecasts, recurring expenses, health score
//!   and budget suggestions
//! - TOML configuration

pub mod analytics;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod interpreter;
pub mod models;
pub mod store;
pub mod text;

pub use analytics::{AnalyticsEngine, AnalyticsReport};
pub use config::Config;
pub use db::{Database, TransactionFilter};
pub use dispatch::{Dispatcher, Response};
pub use error::{Error, ErrorKind, Result};
pub use interpreter::{Intent, Interpreter, ParsedCommand, Slots};
pub use models::{Category, NewTransaction, Transaction, TransactionChanges, TransactionKind};
pub use store::Store;
