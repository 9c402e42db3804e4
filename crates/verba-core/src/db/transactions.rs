//! Transaction operations and the `Store` implementation

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;
use tracing::info;

use super::transaction_filter::TransactionFilter;
use super::{conversion_error, parse_date, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::{
    amount_in_range, new_id, round_money, Category, NewTransaction, Transaction, TransactionChanges,
    TransactionKind,
};
use crate::store::Store;
use crate::text::fold;

const SELECT_TRANSACTIONS: &str = "SELECT t.id, t.kind, t.amount, t.category_id, c.name, t.description, t.date, t.created_at
     FROM transactions t JOIN categories c ON c.id = t.category_id";

impl Database {
    /// Helper to convert a row to Transaction
    /// Column order: id, kind, amount, category_id, category name, description, date, created_at
    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let kind_str: String = row.get(1)?;
        let amount_str: String = row.get(2)?;
        let date_str: String = row.get(6)?;
        let created_at_str: String = row.get(7)?;
        Ok(Transaction {
            id: row.get(0)?,
            kind: kind_str.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
            })?,
            amount: Decimal::from_str(&amount_str).map_err(|e| conversion_error(2, e))?,
            category_id: row.get(3)?,
            category: row.get(4)?,
            description: row.get(5)?,
            date: parse_date(6, &date_str)?,
            created_at: parse_timestamp(7, &created_at_str)?,
        })
    }

    /// Category for a transaction, which must exist with the transaction's kind
    fn category_for_kind(&self, category_id: &str, kind: TransactionKind) -> Result<Category> {
        let category = self
            .category_by_id(category_id)?
            .ok_or_else(|| Error::CategoryNotFound {
                name: category_id.to_string(),
            })?;
        if category.kind != kind {
            return Err(Error::Validation(format!(
                "a categoria '{}' é de {}, não de {}",
                category.name,
                category.kind.label(),
                kind.label()
            )));
        }
        Ok(category)
    }

    fn validate_amount(amount: Decimal) -> Result<Decimal> {
        let amount = round_money(amount);
        if !amount_in_range(amount) {
            return Err(Error::InvalidAmount {
                value: amount.to_string(),
            });
        }
        Ok(amount)
    }

    /// Count all transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Most recent transactions
    pub fn list_transactions(&self, limit: usize) -> Result<Vec<Transaction>> {
        self.query_transactions(&TransactionFilter::new().limit(Some(limit)))
    }
}

impl Store for Database {
    fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let amount = Self::validate_amount(tx.amount)?;
        let category = self.category_for_kind(&tx.category_id, tx.kind)?;

        let transaction = Transaction {
            id: new_id(),
            kind: tx.kind,
            amount,
            category_id: category.id,
            category: category.name,
            description: tx
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            date: tx.date,
            created_at: tx.created_at,
        };

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (id, kind, amount, category_id, description, description_key, date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                transaction.id,
                transaction.kind.as_str(),
                transaction.amount.to_string(),
                transaction.category_id,
                transaction.description,
                transaction.description.as_deref().map(fold),
                transaction.date.to_string(),
                transaction.created_at.to_rfc3339(),
            ],
        )?;

        info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = %transaction.amount,
            category = %transaction.category,
            "Created transaction"
        );
        Ok(transaction)
    }

    fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let transaction = conn
            .query_row(
                &format!("{} WHERE t.id = ?", SELECT_TRANSACTIONS),
                params![id],
                Self::row_to_transaction,
            )
            .optional()?;
        Ok(transaction)
    }

    fn update_transaction(&self, id: &str, changes: &TransactionChanges) -> Result<Transaction> {
        let current = self
            .get_transaction(id)?
            .ok_or_else(|| Error::TransactionNotFound { id: id.to_string() })?;

        // Validate everything before writing anything
        let amount = match changes.amount {
            Some(amount) => Self::validate_amount(amount)?,
            None => current.amount,
        };
        let category = match &changes.category_id {
            Some(category_id) => self.category_for_kind(category_id, current.kind)?,
            None => self.category_for_kind(&current.category_id, current.kind)?,
        };

        let updated = Transaction {
            amount,
            category_id: category.id,
            category: category.name,
            description: match &changes.description {
                Some(d) if d.trim().is_empty() => None,
                Some(d) => Some(d.trim().to_string()),
                None => current.description.clone(),
            },
            date: changes.date.unwrap_or(current.date),
            ..current
        };

        let conn = self.conn()?;
        conn.execute(
            "UPDATE transactions SET amount = ?, category_id = ?, description = ?, description_key = ?, date = ? WHERE id = ?",
            params![
                updated.amount.to_string(),
                updated.category_id,
                updated.description,
                updated.description.as_deref().map(fold),
                updated.date.to_string(),
                updated.id,
            ],
        )?;

        info!(id = %updated.id, "Updated transaction");
        Ok(updated)
    }

    fn delete_transaction(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::TransactionNotFound { id: id.to_string() });
        }
        info!(id = %id, "Deleted transaction");
        Ok(())
    }

    fn query_transactions(&self, filter: &TransactionFilter<'_>) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let built = filter.build();
        let sql = format!(
            "{} {} {} {}",
            SELECT_TRANSACTIONS, built.where_clause, built.order_clause, built.limit_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(built.params_refs().as_slice(), Self::row_to_transaction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(transactions)
    }

    fn create_category(
        &self,
        name: &str,
        kind: TransactionKind,
        created_at: DateTime<Utc>,
    ) -> Result<Category> {
        self.insert_category(name, kind, created_at)
    }

    fn list_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>> {
        self.select_categories(kind)
    }

    fn find_category(&self, name: &str, kind: TransactionKind) -> Result<Option<Category>> {
        self.lookup_category(name, kind)
    }
}
