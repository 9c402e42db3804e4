//! Transaction/category store interface
//!
//! The interpreter never touches storage; the dispatcher and the analytics
//! engine go through this trait. [`Database`](crate::db::Database) is the
//! SQLite implementation.

use chrono::{DateTime, Utc};

use crate::db::TransactionFilter;
use crate::error::Result;
use crate::models::{Category, NewTransaction, Transaction, TransactionChanges, TransactionKind};

pub trait Store {
    /// Persist a transaction and return it with its assigned id
    fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction>;

    fn get_transaction(&self, id: &str) -> Result<Option<Transaction>>;

    /// Apply changes; fails with `TransactionNotFound` if the id is absent
    fn update_transaction(&self, id: &str, changes: &TransactionChanges) -> Result<Transaction>;

    /// Remove a transaction; fails with `TransactionNotFound` if the id is absent
    fn delete_transaction(&self, id: &str) -> Result<()>;

    /// Transactions matching every condition of the filter, newest first
    fn query_transactions(&self, filter: &TransactionFilter<'_>) -> Result<Vec<Transaction>>;

    /// Create a category; names are unique per kind
    fn create_category(
        &self,
        name: &str,
        kind: TransactionKind,
        created_at: DateTime<Utc>,
    ) -> Result<Category>;

    fn list_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>>;

    /// Look up a category by name (accent and case insensitive) and kind
    fn find_category(&self, name: &str, kind: TransactionKind) -> Result<Option<Category>>;
}
