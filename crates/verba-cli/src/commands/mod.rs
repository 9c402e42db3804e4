//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, load_config, parse_now)
//! - `interpret` - Sentence commands (say, parse, shell) and response rendering
//! - `reports` - Analytics reports
//! - `categories` - Category listing
//! - `transactions` - Transaction listing

pub mod categories;
pub mod core;
pub mod interpret;
pub mod reports;
pub mod transactions;

// Re-export command functions for main.rs
pub use categories::*;
pub use core::*;
pub use interpret::*;
pub use reports::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
