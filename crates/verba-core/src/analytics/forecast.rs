//! Next-month spending forecast
//!
//! The estimate is a linearly weighted moving average of the most recent
//! periods (the newest weighs most), scaled by the series trend. The band is
//! one population standard deviation of those periods either side.

use rust_decimal::Decimal;

use super::series::{std_dev, to_f64, to_money, Window};
use super::trend::direction;
use super::types::{Forecast, MonthTotal};
use crate::config::ForecastConfig;
use crate::error::{Error, Result};

/// Weighted moving average of the last `periods` values (weights 1..=k)
pub fn weighted_moving_average(values: &[f64], periods: usize) -> f64 {
    let k = periods.max(1).min(values.len());
    if k == 0 {
        return 0.0;
    }
    let recent = &values[values.len() - k..];
    let (sum, weights) = recent
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, weights), (i, v)| {
            let w = (i + 1) as f64;
            (sum + v * w, weights + w)
        });
    sum / weights
}

/// Forecast one category from its zero-filled window totals
///
/// History starts at the first month with spending; fewer than
/// `config.min_history` periods is an error.
pub fn forecast_category(
    category: &str,
    window: &Window,
    totals: &[Decimal],
    config: &ForecastConfig,
    trend_threshold: f64,
) -> Result<Forecast> {
    let first_active = totals.iter().position(|t| !t.is_zero());
    let history: Vec<MonthTotal> = match first_active {
        Some(start) => window.months[start..]
            .iter()
            .zip(&totals[start..])
            .map(|(month, total)| MonthTotal {
                month: *month,
                total: *total,
            })
            .collect(),
        None => Vec::new(),
    };

    let required = config.min_history.max(2);
    if history.len() < required {
        return Err(Error::InsufficientHistory {
            category: category.to_string(),
            periods: history.len(),
            required,
        });
    }

    let values: Vec<f64> = history.iter().map(|m| to_f64(m.total)).collect();
    let (trend, change) = direction(&values, trend_threshold);
    let estimate = (weighted_moving_average(&values, config.periods) * (1.0 + change)).max(0.0);

    let k = config.periods.max(1).min(values.len());
    let spread = std_dev(&values[values.len() - k..]);

    Ok(Forecast {
        category: category.to_string(),
        target_month: window.next_month(),
        estimate: to_money(estimate),
        lower: to_money((estimate - spread).max(0.0)),
        upper: to_money(estimate + spread),
        trend,
        periods: history.len(),
        history,
    })
}
