//! Recurring expense detection
//!
//! Expenses of a category are grouped into clusters of similar amounts, then
//! each cluster's spacing is checked against weekly, monthly and yearly
//! cadences. A cluster is recurring when it has enough occurrences and most
//! of its intervals fit the cadence nearest its median interval.

use std::collections::{BTreeMap, HashMap};

use chrono::Duration;

use super::series::{median, to_f64, to_money};
use super::types::{Cadence, RecurringExpense};
use crate::config::RecurrenceConfig;
use crate::models::{Transaction, TransactionKind};

/// Group transactions whose amounts stay within `tolerance` of the group median
fn cluster_by_amount<'a>(transactions: &[&'a Transaction], tolerance: f64) -> Vec<Vec<&'a Transaction>> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| a.amount.cmp(&b.amount).then_with(|| a.date.cmp(&b.date)));

    let mut clusters: Vec<Vec<&Transaction>> = Vec::new();
    let mut current: Vec<&Transaction> = Vec::new();
    for tx in sorted {
        let amounts: Vec<f64> = current.iter().map(|t| to_f64(t.amount)).collect();
        let center = median(&amounts);
        let fits = current.is_empty()
            || (center > 0.0 && (to_f64(tx.amount) - center).abs() / center <= tolerance);
        if !fits {
            clusters.push(std::mem::take(&mut current));
        }
        current.push(tx);
    }
    if !current.is_empty() {
        clusters.push(current);
    }
    clusters
}

/// The cadence whose period is closest to `interval`, with its period and tolerance
fn nearest_cadence(interval: f64, config: &RecurrenceConfig) -> (Cadence, i64, i64) {
    let candidates = [
        (Cadence::Weekly, config.weekly_days, config.weekly_tolerance),
        (Cadence::Monthly, config.monthly_days, config.monthly_tolerance),
        (Cadence::Yearly, config.yearly_days, config.yearly_tolerance),
    ];
    let mut best = candidates[0];
    for candidate in candidates {
        if (interval - candidate.1 as f64).abs() < (interval - best.1 as f64).abs() {
            best = candidate;
        }
    }
    best
}

fn most_common_description(cluster: &[&Transaction]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tx in cluster {
        if let Some(description) = tx.description.as_deref() {
            *counts.entry(description).or_default() += 1;
        }
    }
    let best = counts.values().copied().max()?;
    counts
        .into_iter()
        .find(|(_, count)| *count == best)
        .map(|(description, _)| description.to_string())
}

fn detect_cluster(
    category: &str,
    cluster: &[&Transaction],
    config: &RecurrenceConfig,
) -> Option<RecurringExpense> {
    if cluster.len() < config.min_occurrences.max(2) {
        return None;
    }

    let mut sorted = cluster.to_vec();
    sorted.sort_by_key(|t| t.date);
    let first_seen = sorted.first()?.date;
    let last_seen = sorted.last()?.date;

    let intervals: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days() as f64)
        .collect();
    let interval = median(&intervals);
    let (cadence, period, tolerance) = nearest_cadence(interval, config);

    let consistent = intervals
        .iter()
        .filter(|&&days| (days - period as f64).abs() <= tolerance as f64)
        .count();
    if (consistent as f64 / intervals.len() as f64) < config.interval_consistency {
        return None;
    }

    let amounts: Vec<f64> = sorted.iter().map(|t| to_f64(t.amount)).collect();
    Some(RecurringExpense {
        category: category.to_string(),
        description: most_common_description(&sorted),
        amount: to_money(median(&amounts)),
        interval_days: interval,
        cadence,
        occurrences: sorted.len(),
        first_seen,
        last_seen,
        next_expected: last_seen + Duration::days(interval.round() as i64),
    })
}

/// Recurring expenses among `transactions`, ordered by category then amount
pub fn detect_recurring(
    transactions: &[Transaction],
    config: &RecurrenceConfig,
) -> Vec<RecurringExpense> {
    let mut by_category: HashMap<&str, Vec<&Transaction>> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
    {
        by_category.entry(tx.category.as_str()).or_default().push(tx);
    }

    let mut found: Vec<RecurringExpense> = by_category
        .into_iter()
        .flat_map(|(category, txs)| {
            cluster_by_amount(&txs, config.amount_tolerance)
                .into_iter()
                .filter_map(move |cluster| detect_cluster(category, &cluster, config))
                .collect::<Vec<_>>()
        })
        .collect();

    found.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| b.amount.cmp(&a.amount))
    });
    found
}
