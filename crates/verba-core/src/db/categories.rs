//! Category operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::{
    new_id, Category, TransactionKind, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES,
};
use crate::text::category_key;

impl Database {
    /// Helper to convert a row to Category
    /// Column order: id, name, kind, created_at
    pub(crate) fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        let kind_str: String = row.get(2)?;
        let created_at_str: String = row.get(3)?;
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: kind_str.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            created_at: parse_timestamp(3, &created_at_str)?,
        })
    }

    pub(crate) fn insert_category(
        &self,
        name: &str,
        kind: TransactionKind,
        created_at: DateTime<Utc>,
    ) -> Result<Category> {
        let name = name.trim();
        let key = category_key(name);
        if key.is_empty() {
            return Err(Error::Validation(
                "o nome da categoria não pode ser vazio".to_string(),
            ));
        }

        if let Some(existing) = self.lookup_category(name, kind)? {
            return Err(Error::Validation(format!(
                "a categoria '{}' já existe para {}",
                existing.name,
                kind.label()
            )));
        }

        let category = Category {
            id: new_id(),
            name: name.to_string(),
            kind,
            created_at,
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (id, name, name_key, kind, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                category.id,
                category.name,
                key,
                kind.as_str(),
                created_at.to_rfc3339(),
            ],
        )?;

        info!(id = %category.id, name = %category.name, kind = %kind, "Created category");
        Ok(category)
    }

    pub(crate) fn lookup_category(
        &self,
        name: &str,
        kind: TransactionKind,
    ) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, name, kind, created_at FROM categories WHERE name_key = ? AND kind = ?",
                params![category_key(name), kind.as_str()],
                Self::row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    pub(crate) fn category_by_id(&self, id: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, name, kind, created_at FROM categories WHERE id = ?",
                params![id],
                Self::row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    pub(crate) fn select_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, kind, created_at FROM categories
             WHERE (?1 IS NULL OR kind = ?1)
             ORDER BY kind, name_key",
        )?;
        let categories = stmt
            .query_map(params![kind.map(|k| k.as_str())], Self::row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    /// Create the default expense and income categories that don't exist yet
    ///
    /// Returns how many were created.
    pub fn seed_default_categories(&self, now: DateTime<Utc>) -> Result<usize> {
        let defaults = DEFAULT_EXPENSE_CATEGORIES
            .iter()
            .map(|name| (*name, TransactionKind::Expense))
            .chain(
                DEFAULT_INCOME_CATEGORIES
                    .iter()
                    .map(|name| (*name, TransactionKind::Income)),
            );

        let mut created = 0;
        for (name, kind) in defaults {
            if self.lookup_category(name, kind)?.is_none() {
                self.insert_category(name, kind, now)?;
                created += 1;
            }
        }

        info!(created, "Seeded default categories");
        Ok(created)
    }
}
