//! Transaction filter builder for constructing dynamic SQL queries
//!
//! Every condition that is set is combined with AND.

use chrono::NaiveDate;

use crate::models::TransactionKind;
use crate::text::{category_key, fold};

/// Builder for transaction query filters
///
/// The lifetime `'query` is how long the borrowed category name and search
/// text must remain valid.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter<'query> {
    pub kind: Option<TransactionKind>,
    pub category: Option<&'query str>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub search: Option<&'query str>,
    pub limit: Option<usize>,
    pub oldest_first: bool,
}

/// SQL components produced by [`TransactionFilter::build`]
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: String,
    /// LIMIT clause (empty if unbounded)
    pub limit_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl<'query> TransactionFilter<'query> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Category name; compared accent and case insensitively
    pub fn category(mut self, name: Option<&'query str>) -> Self {
        self.category = name;
        self
    }

    /// Inclusive date range
    pub fn date_range(mut self, range: Option<(NaiveDate, NaiveDate)>) -> Self {
        self.date_range = range;
        self
    }

    /// Text contained in the description
    pub fn search(mut self, query: Option<&'query str>) -> Self {
        self.search = query;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn oldest_first(mut self, value: bool) -> Self {
        self.oldest_first = value;
        self
    }

    pub fn build(&self) -> FilterResult {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(kind) = self.kind {
            conditions.push("t.kind = ?".to_string());
            params.push(Box::new(kind.as_str()));
        }

        if let Some(name) = self.category {
            if !name.trim().is_empty() {
                conditions.push("c.name_key = ?".to_string());
                params.push(Box::new(category_key(name)));
            }
        }

        if let Some((from_date, to_date)) = self.date_range {
            conditions.push("t.date >= ? AND t.date <= ?".to_string());
            params.push(Box::new(from_date.to_string()));
            params.push(Box::new(to_date.to_string()));
        }

        if let Some(q) = self.search {
            if !q.trim().is_empty() {
                conditions.push("t.description_key LIKE ? ESCAPE '\\'".to_string());
                params.push(Box::new(search_pattern(q)));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order_dir = if self.oldest_first { "ASC" } else { "DESC" };
        let order_clause = format!(
            "ORDER BY t.date {dir}, t.created_at {dir}, t.id {dir}",
            dir = order_dir
        );

        let limit_clause = match self.limit {
            Some(n) => {
                params.push(Box::new(n as i64));
                "LIMIT ?".to_string()
            }
            None => String::new(),
        };

        FilterResult {
            where_clause,
            order_clause,
            limit_clause,
            params,
        }
    }
}

/// LIKE pattern matching `query` anywhere in a folded description
///
/// `%`, `_` and `\` in the query match themselves.
fn search_pattern(query: &str) -> String {
    let mut pattern = String::from("%");
    for c in fold(query.trim()).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl FilterResult {
    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        let result = TransactionFilter::new().build();
        assert!(result.where_clause.is_empty());
        assert!(result.limit_clause.is_empty());
        assert!(result.params.is_empty());
        assert!(result.order_clause.contains("DESC"));
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let result = TransactionFilter::new()
            .kind(Some(TransactionKind::Expense))
            .category(Some("Alimentação"))
            .date_range(Some((from, to)))
            .search(Some("padaria"))
            .build();

        assert_eq!(result.where_clause.matches(" AND ").count(), 4);
        assert_eq!(result.params.len(), 5);
    }

    #[test]
    fn test_search_pattern_is_folded_and_escaped() {
        assert_eq!(search_pattern(" Almoço "), "%almoco%");
        assert_eq!(search_pattern("50%"), "%50\\%%");
        assert_eq!(search_pattern("a_b\\c"), "%a\\_b\\\\c%");

        let result = TransactionFilter::new().search(Some("café")).build();
        assert!(result.where_clause.contains("description_key LIKE ? ESCAPE"));
    }

    #[test]
    fn test_blank_search_ignored() {
        let result = TransactionFilter::new().search(Some("   ")).build();
        assert!(result.where_clause.is_empty());
    }

    #[test]
    fn test_limit_and_order() {
        let result = TransactionFilter::new()
            .limit(Some(10))
            .oldest_first(true)
            .build();
        assert_eq!(result.limit_clause, "LIMIT ?");
        assert_eq!(result.params.len(), 1);
        assert!(result.order_clause.starts_with("ORDER BY t.date ASC"));
    }
}
