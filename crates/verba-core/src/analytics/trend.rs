//! Spending trends per category and of the overall money flows

use rust_decimal::Decimal;

use super::series::{category_totals, mean, monthly_totals, to_f64, to_money, Window};
use super::types::{FlowTrend, MonthFlow, MonthTotal, OverallTrends, TrendDirection, TrendReport};
use crate::models::{Transaction, TransactionKind};
use crate::text::category_key;

/// Direction and relative change of the last value against the series mean
///
/// A zero mean with a positive last value counts as a full (1.0) rise.
pub fn direction(values: &[f64], threshold: f64) -> (TrendDirection, f64) {
    let Some(&last) = values.last() else {
        return (TrendDirection::Flat, 0.0);
    };
    let avg = mean(values);

    let change = if avg.abs() < f64::EPSILON {
        if last > 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        (last - avg) / avg
    };
    if !change.is_finite() {
        return (TrendDirection::Flat, 0.0);
    }

    let direction = if change > threshold {
        TrendDirection::Rising
    } else if change < -threshold {
        TrendDirection::Falling
    } else {
        TrendDirection::Flat
    };
    (direction, change)
}

fn report(category: String, window: &Window, totals: &[Decimal], threshold: f64) -> TrendReport {
    let values: Vec<f64> = totals.iter().map(|t| to_f64(*t)).collect();
    let (direction, magnitude) = direction(&values, threshold);
    TrendReport {
        category,
        direction,
        magnitude,
        mean: to_money(mean(&values)),
        last: totals.last().copied().unwrap_or(Decimal::ZERO),
        series: window
            .months
            .iter()
            .zip(totals)
            .map(|(month, total)| MonthTotal {
                month: *month,
                total: *total,
            })
            .collect(),
    }
}

/// Expense trends over the window, biggest movers first
///
/// With `category`, only that category is reported (an empty list when it
/// had no spending in the window).
pub fn category_trends(
    transactions: &[Transaction],
    window: &Window,
    category: Option<&str>,
    threshold: f64,
) -> Vec<TrendReport> {
    let wanted = category.map(category_key);
    let mut reports: Vec<TrendReport> = category_totals(transactions, window, TransactionKind::Expense)
        .into_iter()
        .filter(|(name, _)| wanted.as_ref().map_or(true, |key| category_key(name) == *key))
        .map(|(name, totals)| report(name, window, &totals, threshold))
        .collect();

    reports.sort_by(|a, b| {
        b.magnitude
            .abs()
            .total_cmp(&a.magnitude.abs())
            .then_with(|| a.category.cmp(&b.category))
    });
    reports
}

/// Least-squares slope of the series after scaling it by its maximum
///
/// Zero for fewer than two values, a series that never goes above zero, or a
/// constant series.
pub fn normalized_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 || values.iter().all(|v| *v == values[0]) {
        return 0.0;
    }

    let n = values.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, value) in values.iter().enumerate() {
        let x = i as f64;
        let y = value / max;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

fn flow_trend(values: &[Decimal]) -> FlowTrend {
    let values: Vec<f64> = values.iter().map(|v| to_f64(*v)).collect();
    let slope = normalized_slope(&values);
    let direction = if slope > 0.0 {
        TrendDirection::Rising
    } else if slope < 0.0 {
        TrendDirection::Falling
    } else {
        TrendDirection::Flat
    };
    FlowTrend {
        direction,
        percentage: slope.abs() * 100.0,
    }
}

/// Month-by-month income, expenses and balance with the trend of each
pub fn overall_trends(transactions: &[Transaction], window: &Window) -> OverallTrends {
    let income = monthly_totals(transactions, window, |t| t.kind == TransactionKind::Income);
    let expenses = monthly_totals(transactions, window, |t| t.kind == TransactionKind::Expense);
    let months: Vec<MonthFlow> = window
        .months
        .iter()
        .zip(income.iter().zip(&expenses))
        .map(|(month, (income, expenses))| MonthFlow {
            month: *month,
            income: *income,
            expenses: *expenses,
            balance: income - expenses,
        })
        .collect();
    let savings: Vec<Decimal> = months.iter().map(|m| m.balance).collect();

    OverallTrends {
        income: flow_trend(&income),
        expenses: flow_trend(&expenses),
        savings: flow_trend(&savings),
        months,
    }
}
