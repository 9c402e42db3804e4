//! Transaction command implementations

use anyhow::Result;
use verba_core::db::Database;

use super::truncate;

pub fn cmd_transactions_list(db: &Database, limit: usize) -> Result<()> {
    let transactions = db.list_transactions(limit)?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  verba say gastei 50 reais no mercado");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.kind {
            verba_core::TransactionKind::Expense => {
                format!("\x1b[31m-{:.2}\x1b[0m", tx.amount) // Red for expenses
            }
            verba_core::TransactionKind::Income => {
                format!("\x1b[32m+{:.2}\x1b[0m", tx.amount) // Green for income
            }
        };

        println!(
            "   {} │ {:>19} │ {:20} │ {} │ {}",
            tx.date,
            amount_str,
            truncate(&tx.category, 20),
            truncate(tx.description.as_deref().unwrap_or(""), 30),
            &tx.id[..8.min(tx.id.len())]
        );
    }

    Ok(())
}
