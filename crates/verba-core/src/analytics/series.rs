//! Monthly series and small statistics helpers

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::interpreter::normalize::month_of;
use crate::models::{Transaction, TransactionKind};

/// A run of whole calendar months
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// First day of each month, oldest first
    pub months: Vec<NaiveDate>,
}

impl Window {
    /// The `months` complete calendar months before the month of `today`
    pub fn lookback(today: NaiveDate, months: u32) -> Self {
        let current = month_of(today).0;
        let months = months.max(1);
        let first = current
            .checked_sub_months(Months::new(months))
            .unwrap_or(current);
        let months: Vec<NaiveDate> = (0..months)
            .filter_map(|i| first.checked_add_months(Months::new(i)))
            .collect();
        Self {
            start: first,
            end: current.pred_opt().unwrap_or(current),
            months,
        }
    }

    /// First day of the month right after the window
    pub fn next_month(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if !self.contains(date) {
            return None;
        }
        let months = (date.year() - self.start.year()) * 12 + date.month() as i32
            - self.start.month() as i32;
        usize::try_from(months).ok()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Zero-filled monthly totals of the transactions accepted by `keep`
pub fn monthly_totals<F>(transactions: &[Transaction], window: &Window, keep: F) -> Vec<Decimal>
where
    F: Fn(&Transaction) -> bool,
{
    let mut totals = vec![Decimal::ZERO; window.len()];
    for tx in transactions.iter().filter(|tx| keep(tx)) {
        if let Some(slot) = window.index_of(tx.date).and_then(|i| totals.get_mut(i)) {
            *slot += tx.amount;
        }
    }
    totals
}

/// Zero-filled monthly totals per category of one kind
///
/// Only categories with at least one transaction in the window appear.
pub fn category_totals(
    transactions: &[Transaction],
    window: &Window,
    kind: TransactionKind,
) -> BTreeMap<String, Vec<Decimal>> {
    let mut by_category: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind == kind && window.contains(tx.date))
    {
        let Some(i) = window.index_of(tx.date) else {
            continue;
        };
        let totals = by_category
            .entry(tx.category.clone())
            .or_insert_with(|| vec![Decimal::ZERO; window.len()]);
        if let Some(slot) = totals.get_mut(i) {
            *slot += tx.amount;
        }
    }
    by_category
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Money value from a float, rounded to cents; non-finite values become zero
pub fn to_money(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Percent change from `previous` to `current`; `None` when there is no base
pub fn percent_change(previous: Decimal, current: Decimal) -> Option<f64> {
    if previous.is_zero() {
        return None;
    }
    let previous = to_f64(previous);
    Some((to_f64(current) - previous) / previous * 100.0)
}
