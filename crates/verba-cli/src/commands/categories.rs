//! Category command implementations

use anyhow::Result;
use verba_core::{db::Database, models::TransactionKind, Store};

pub fn cmd_categories(db: &Database, kind: Option<&str>) -> Result<()> {
    let kind = kind
        .map(|k| k.parse::<TransactionKind>())
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let categories = db.list_categories(kind)?;

    if categories.is_empty() {
        println!("No categories found. Seed the defaults with:");
        println!("  verba init");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    for category in &categories {
        println!("   {:8} │ {}", category.kind.label(), category.name);
    }
    println!();
    println!("   {} categories", categories.len());

    Ok(())
}
