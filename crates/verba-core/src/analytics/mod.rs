//! Analytics engine
//!
//! Derives balances, period reports, trends, forecasts, recurring expenses,
//! a health score and budget suggestions from stored transactions.
//!
//! Every entry point fetches its working set from the store once and computes
//! on the in-memory copy. "Now" is always passed in, never read from the
//! clock, so results are reproducible.
//!
//! ```rust,ignore
//! use verba_core::analytics::AnalyticsEngine;
//!
//! let engine = AnalyticsEngine::new(&db, &config);
//! let report = engine.monthly_report(2024, 1)?;
//! let score = engine.health_score(None, now)?;
//! ```

pub mod forecast;
pub mod health;
pub mod recurrence;
pub mod series;
pub mod trend;
pub mod types;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{Config, MAX_LOOKBACK_MONTHS};
use crate::db::TransactionFilter;
use crate::error::{Error, Result};
use crate::interpreter::normalize::month_of;
use crate::models::{Transaction, TransactionKind};
use crate::store::Store;
use crate::text::category_key;

pub use health::HealthInputs;
pub use series::Window;
pub use types::{
    AnalyticsReport, Balance, BudgetBasis, BudgetPlan, BudgetSuggestion, BudgetSummary, Cadence,
    CategoryTotal, FlowTrend, Forecast, ForecastSet, HealthFactor, HealthGrade, HealthScore,
    MonthFlow, MonthTotal, MonthlyReport, OverallTrends, PeriodComparison, RecurringExpense,
    TopExpense, TrendDirection, TrendReport, TrendsReport,
};

use series::{category_totals, monthly_totals, percent_change, to_f64, to_money};

const TOP_EXPENSES: usize = 5;

/// Runs analytics against a store
pub struct AnalyticsEngine<'a> {
    store: &'a dyn Store,
    config: &'a Config,
}

fn sum_kind(transactions: &[Transaction], kind: TransactionKind) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount)
        .sum()
}

fn in_range(transactions: &[Transaction], start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| start <= t.date && t.date <= end)
        .cloned()
        .collect()
}

/// The period of equal length right before `start..=end`
///
/// A whole calendar month compares against the previous calendar month.
fn previous_period(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let prev_end = start.pred_opt().unwrap_or(start);
    if month_of(start) == (start, end) {
        return month_of(prev_end);
    }
    let days = (end - start).num_days();
    (prev_end - Duration::days(days), prev_end)
}

fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut grouped: BTreeMap<(TransactionKind, String), (Decimal, usize)> = BTreeMap::new();
    for tx in transactions {
        let entry = grouped
            .entry((tx.kind, tx.category.clone()))
            .or_insert((Decimal::ZERO, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let income = sum_kind(transactions, TransactionKind::Income);
    let expenses = sum_kind(transactions, TransactionKind::Expense);
    let mut totals: Vec<CategoryTotal> = grouped
        .into_iter()
        .map(|((kind, category), (total, count))| {
            let base = match kind {
                TransactionKind::Income => income,
                TransactionKind::Expense => expenses,
            };
            let share = if base.is_zero() {
                0.0
            } else {
                to_f64(total) / to_f64(base) * 100.0
            };
            CategoryTotal {
                category,
                kind,
                total,
                count,
                share,
            }
        })
        .collect();

    totals.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.category.cmp(&b.category))
    });
    totals
}

fn top_expenses(transactions: &[Transaction]) -> Vec<TopExpense> {
    let mut expenses: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
        .collect();
    expenses.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.date.cmp(&b.date)));
    expenses
        .into_iter()
        .take(TOP_EXPENSES)
        .map(|t| TopExpense {
            id: t.id.clone(),
            date: t.date,
            category: t.category.clone(),
            description: t.description.clone(),
            amount: t.amount,
        })
        .collect()
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(store: &'a dyn Store, config: &'a Config) -> Self {
        Self { store, config }
    }

    fn window(&self, months: Option<u32>, now: DateTime<Utc>) -> Window {
        let months = months
            .unwrap_or(self.config.analytics.lookback_months)
            .min(MAX_LOOKBACK_MONTHS);
        Window::lookback(now.date_naive(), months)
    }

    fn fetch(&self, range: Option<(NaiveDate, NaiveDate)>) -> Result<Vec<Transaction>> {
        let transactions = self
            .store
            .query_transactions(&TransactionFilter::new().date_range(range).oldest_first(true))?;
        debug!(count = transactions.len(), "Loaded analytics working set");
        Ok(transactions)
    }

    /// Totals of every transaction up to `as_of` (inclusive), or all of them
    pub fn balance(&self, as_of: Option<NaiveDate>) -> Result<Balance> {
        let transactions: Vec<Transaction> = self
            .fetch(None)?
            .into_iter()
            .filter(|t| as_of.map_or(true, |d| t.date <= d))
            .collect();
        let income = sum_kind(&transactions, TransactionKind::Income);
        let expenses = sum_kind(&transactions, TransactionKind::Expense);
        Ok(Balance {
            as_of,
            income,
            expenses,
            balance: income - expenses,
            transactions: transactions.len(),
        })
    }

    /// Report for one calendar month
    pub fn monthly_report(&self, year: i32, month: u32) -> Result<MonthlyReport> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::Validation(format!("mês inválido: {}/{}", month, year)))?;
        let (start, end) = month_of(first);
        self.period_report(start, end)
    }

    /// Report for an arbitrary inclusive period, compared with the period
    /// of the same length right before it
    ///
    /// The prediction covers the calendar month after the one `end` falls in.
    pub fn period_report(&self, start: NaiveDate, end: NaiveDate) -> Result<MonthlyReport> {
        if start > end {
            return Err(Error::invalid_range(start, end));
        }
        let (prev_start, prev_end) = previous_period(start, end);
        let all = self.fetch(Some((prev_start, end)))?;
        let current = in_range(&all, start, end);
        let previous = in_range(&all, prev_start, prev_end);

        let income = sum_kind(&current, TransactionKind::Income);
        let expenses = sum_kind(&current, TransactionKind::Expense);
        let net = income - expenses;
        let savings_rate = if income.is_zero() {
            0.0
        } else {
            to_f64(net) / to_f64(income) * 100.0
        };
        let message = if current.is_empty() {
            "Nenhuma transação no período.".to_string()
        } else if income.is_zero() {
            health::savings_message(-1.0).to_string()
        } else {
            health::savings_message(savings_rate / 100.0).to_string()
        };

        let prev_income = sum_kind(&previous, TransactionKind::Income);
        let prev_expenses = sum_kind(&previous, TransactionKind::Expense);

        let next_month = month_of(end).1.succ_opt().unwrap_or(end);
        let prediction = self.forecast_window(&Window::lookback(
            next_month,
            self.config.analytics.lookback_months.min(MAX_LOOKBACK_MONTHS),
        ))?;

        Ok(MonthlyReport {
            start,
            end,
            income,
            expenses,
            net,
            savings_rate,
            by_category: category_breakdown(&current),
            top_expenses: top_expenses(&current),
            previous: PeriodComparison {
                start: prev_start,
                end: prev_end,
                income: prev_income,
                expenses: prev_expenses,
                income_change: percent_change(prev_income, income),
                expense_change: percent_change(prev_expenses, expenses),
            },
            message,
            transactions: current.len(),
            prediction,
        })
    }

    /// Overall income, expense and savings trends plus expense trends per
    /// category over the lookback window
    ///
    /// `category` narrows the per-category part only.
    pub fn trends(
        &self,
        category: Option<&str>,
        months: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<TrendsReport> {
        let window = self.window(months, now);
        let transactions = self.fetch(Some((window.start, window.end)))?;
        Ok(TrendsReport {
            overall: trend::overall_trends(&transactions, &window),
            categories: trend::category_trends(
                &transactions,
                &window,
                category,
                self.config.analytics.trend_threshold,
            ),
        })
    }

    /// Next-month forecast for one expense category
    pub fn forecast(
        &self,
        category: &str,
        months: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Forecast> {
        let window = self.window(months, now);
        let transactions = self.fetch(Some((window.start, window.end)))?;
        let key = category_key(category);
        let totals = monthly_totals(&transactions, &window, |t| {
            t.kind == TransactionKind::Expense && category_key(&t.category) == key
        });
        let name = transactions
            .iter()
            .find(|t| t.kind == TransactionKind::Expense && category_key(&t.category) == key)
            .map_or(category, |t| t.category.as_str());

        forecast::forecast_category(
            name,
            &window,
            &totals,
            &self.config.analytics.forecast,
            self.config.analytics.trend_threshold,
        )
    }

    /// Forecasts for every expense category with enough history
    pub fn forecast_all(&self, months: Option<u32>, now: DateTime<Utc>) -> Result<ForecastSet> {
        self.forecast_window(&self.window(months, now))
    }

    /// Forecasts for the month right after `window`
    fn forecast_window(&self, window: &Window) -> Result<ForecastSet> {
        let transactions = self.fetch(Some((window.start, window.end)))?;

        let mut set = ForecastSet::default();
        for (category, totals) in category_totals(&transactions, window, TransactionKind::Expense) {
            match forecast::forecast_category(
                &category,
                window,
                &totals,
                &self.config.analytics.forecast,
                self.config.analytics.trend_threshold,
            ) {
                Ok(forecast) => set.forecasts.push(forecast),
                Err(Error::InsufficientHistory { .. }) => set.insufficient.push(category),
                Err(e) => return Err(e),
            }
        }
        set.forecasts.sort_by(|a, b| b.estimate.cmp(&a.estimate));
        Ok(set)
    }

    /// Recurring expenses seen from the window start up to today
    pub fn recurring(
        &self,
        months: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RecurringExpense>> {
        let window = self.window(months, now);
        let transactions = self.fetch(Some((window.start, now.date_naive())))?;
        Ok(recurrence::detect_recurring(
            &transactions,
            &self.config.analytics.recurrence,
        ))
    }

    /// Financial health score over the lookback window
    pub fn health_score(&self, months: Option<u32>, now: DateTime<Utc>) -> Result<HealthScore> {
        let window = self.window(months, now);
        let today = now.date_naive();
        let all: Vec<Transaction> = self
            .fetch(None)?
            .into_iter()
            .filter(|t| t.date <= today)
            .collect();

        let monthly = |kind: TransactionKind| -> Vec<f64> {
            monthly_totals(&all, &window, |t| t.kind == kind)
                .into_iter()
                .map(to_f64)
                .collect()
        };
        let default_key = category_key(&self.config.interpreter.default_category);
        let uncategorized: Decimal = all
            .iter()
            .filter(|t| {
                t.kind == TransactionKind::Expense
                    && window.contains(t.date)
                    && category_key(&t.category) == default_key
            })
            .map(|t| t.amount)
            .sum();
        let recurring_monthly: f64 = recurrence::detect_recurring(
            &in_range(&all, window.start, today),
            &self.config.analytics.recurrence,
        )
        .iter()
        .map(RecurringExpense::monthly_amount)
        .sum();
        let balance = sum_kind(&all, TransactionKind::Income) - sum_kind(&all, TransactionKind::Expense);

        let inputs = HealthInputs {
            monthly_income: monthly(TransactionKind::Income),
            monthly_expenses: monthly(TransactionKind::Expense),
            uncategorized: to_f64(uncategorized),
            recurring_monthly,
            balance: to_f64(balance),
        };
        let score = health::health_score(&inputs, &self.config.analytics.health);
        debug!(score = score.score, grade = %score.grade, "Computed health score");
        Ok(score)
    }

    /// Suggested monthly caps per expense category
    pub fn budget_suggestions(
        &self,
        months: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<BudgetSuggestion>> {
        let window = self.window(months, now);
        let transactions = self.fetch(Some((window.start, now.date_naive())))?;
        let in_window = in_range(&transactions, window.start, window.end);

        let totals = category_totals(&in_window, &window, TransactionKind::Expense);
        let recurring =
            recurrence::detect_recurring(&transactions, &self.config.analytics.recurrence);
        Ok(health::budget_suggestions(
            &totals,
            &recurring,
            &self.config.analytics.budget,
        ))
    }

    /// Budget suggestions plus the 50/30/20 summary of the same window
    pub fn budget_plan(&self, months: Option<u32>, now: DateTime<Utc>) -> Result<BudgetPlan> {
        let suggestions = self.budget_suggestions(months, now)?;
        let window = self.window(months, now);
        let transactions = self.fetch(Some((window.start, window.end)))?;
        let income: Vec<f64> =
            monthly_totals(&transactions, &window, |t| t.kind == TransactionKind::Income)
                .into_iter()
                .map(to_f64)
                .collect();
        let summary = health::budget_summary(
            to_money(series::mean(&income)),
            &suggestions,
            &self.config.analytics.budget,
        );
        Ok(BudgetPlan {
            suggestions,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::Database;
    use crate::models::NewTransaction;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories(now()).unwrap();
        db
    }

    fn add(db: &Database, kind: TransactionKind, category: &str, amount: i64, day: NaiveDate) {
        let category = db.find_category(category, kind).unwrap().unwrap();
        db.create_transaction(&NewTransaction {
            kind,
            amount: Decimal::new(amount, 0),
            category_id: category.id,
            description: None,
            date: day,
            created_at: now(),
        })
        .unwrap();
    }

    #[test]
    fn test_previous_period() {
        assert_eq!(
            previous_period(date(2024, 3, 1), date(2024, 3, 31)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            previous_period(date(2024, 3, 11), date(2024, 3, 20)),
            (date(2024, 3, 1), date(2024, 3, 10))
        );
    }

    #[test]
    fn test_balance_as_of() {
        let db = setup();
        add(&db, TransactionKind::Income, "Salário", 5000, date(2024, 6, 5));
        add(&db, TransactionKind::Expense, "Moradia", 1500, date(2024, 6, 10));
        add(&db, TransactionKind::Expense, "Lazer", 200, date(2024, 7, 2));

        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);

        let all = engine.balance(None).unwrap();
        assert_eq!(all.balance, Decimal::new(3300, 0));
        assert_eq!(all.transactions, 3);

        let june = engine.balance(Some(date(2024, 6, 30))).unwrap();
        assert_eq!(june.balance, Decimal::new(3500, 0));
        assert_eq!(june.expenses, Decimal::new(1500, 0));
    }

    #[test]
    fn test_window_override_is_capped() {
        let db = setup();
        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);

        let window = engine.window(Some(u32::MAX), now());
        assert_eq!(window.len(), MAX_LOOKBACK_MONTHS as usize);
        assert_eq!(window.end, date(2024, 6, 30));
    }

    #[test]
    fn test_largest_amounts_sum_without_overflow() {
        let db = setup();
        let category = db
            .find_category("Moradia", TransactionKind::Expense)
            .unwrap()
            .unwrap();
        for day in [5, 6] {
            db.create_transaction(&NewTransaction {
                kind: TransactionKind::Expense,
                amount: crate::models::MAX_AMOUNT,
                category_id: category.id.clone(),
                description: None,
                date: date(2024, 6, day),
                created_at: now(),
            })
            .unwrap();
        }

        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);

        let balance = engine.balance(None).unwrap();
        assert_eq!(balance.expenses, crate::models::MAX_AMOUNT * Decimal::from(2));
        let report = engine.monthly_report(2024, 6).unwrap();
        assert_eq!(report.expenses, balance.expenses);
        let score = engine.health_score(None, now()).unwrap();
        assert!((0.0..=100.0).contains(&score.score));
    }

    #[test]
    fn test_monthly_report() {
        let db = setup();
        add(&db, TransactionKind::Income, "Salário", 5000, date(2024, 6, 5));
        add(&db, TransactionKind::Expense, "Moradia", 1500, date(2024, 6, 10));
        add(&db, TransactionKind::Expense, "Alimentação", 500, date(2024, 6, 12));
        add(&db, TransactionKind::Expense, "Alimentação", 1000, date(2024, 5, 12));

        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);
        let report = engine.monthly_report(2024, 6).unwrap();

        assert_eq!(report.start, date(2024, 6, 1));
        assert_eq!(report.end, date(2024, 6, 30));
        assert_eq!(report.income, Decimal::new(5000, 0));
        assert_eq!(report.expenses, Decimal::new(2000, 0));
        assert_eq!(report.net, Decimal::new(3000, 0));
        assert!((report.savings_rate - 60.0).abs() < 1e-9);
        assert_eq!(report.transactions, 3);
        assert_eq!(report.top_expenses[0].category, "Moradia");

        let housing = report
            .by_category
            .iter()
            .find(|c| c.category == "Moradia")
            .unwrap();
        assert!((housing.share - 75.0).abs() < 1e-9);

        assert_eq!(report.previous.expenses, Decimal::new(1000, 0));
        assert_eq!(report.previous.expense_change, Some(100.0));
        assert_eq!(report.previous.income_change, None);

        assert!(matches!(
            engine.monthly_report(2024, 13),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_forecast_and_trends_use_complete_months() {
        let db = setup();
        add(&db, TransactionKind::Expense, "Alimentação", 100, date(2024, 4, 3));
        add(&db, TransactionKind::Expense, "Alimentação", 110, date(2024, 5, 3));
        add(&db, TransactionKind::Expense, "Alimentação", 121, date(2024, 6, 3));
        // Current month is outside the window
        add(&db, TransactionKind::Expense, "Alimentação", 5000, date(2024, 7, 3));
        add(&db, TransactionKind::Expense, "Lazer", 50, date(2024, 6, 20));

        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);

        let forecast = engine.forecast("alimentacao", None, now()).unwrap();
        assert_eq!(forecast.category, "Alimentação");
        assert!(forecast.estimate > Decimal::new(121, 0));
        assert!(forecast.estimate < Decimal::new(200, 0));

        let set = engine.forecast_all(None, now()).unwrap();
        assert_eq!(set.forecasts.len(), 1);
        assert_eq!(set.insufficient, vec!["Lazer".to_string()]);

        assert!(matches!(
            engine.forecast("Lazer", None, now()),
            Err(Error::InsufficientHistory { .. })
        ));

        let trends = engine.trends(Some("Alimentação"), Some(3), now()).unwrap();
        assert_eq!(trends.categories.len(), 1);
        assert_eq!(trends.categories[0].series.len(), 3);
        assert_eq!(trends.categories[0].last, Decimal::new(121, 0));
        // The category filter leaves the overall flows untouched
        assert_eq!(trends.overall.months[2].expenses, Decimal::new(171, 0));
    }

    #[test]
    fn test_overall_trends() {
        let db = setup();
        for (m, expense) in [(4, 100), (5, 200), (6, 300)] {
            add(&db, TransactionKind::Income, "Salário", 1000, date(2024, m, 5));
            add(&db, TransactionKind::Expense, "Lazer", expense, date(2024, m, 15));
        }

        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);
        let overall = engine.trends(None, Some(3), now()).unwrap().overall;

        assert_eq!(overall.income.direction, TrendDirection::Flat);
        assert_eq!(overall.income.percentage, 0.0);
        assert_eq!(overall.expenses.direction, TrendDirection::Rising);
        assert!((overall.expenses.percentage - 100.0 / 3.0).abs() < 1e-6);
        assert_eq!(overall.savings.direction, TrendDirection::Falling);
        assert!((overall.savings.percentage - 100.0 / 9.0).abs() < 1e-6);

        let months: Vec<(NaiveDate, Decimal)> =
            overall.months.iter().map(|m| (m.month, m.balance)).collect();
        assert_eq!(
            months,
            vec![
                (date(2024, 4, 1), Decimal::new(900, 0)),
                (date(2024, 5, 1), Decimal::new(800, 0)),
                (date(2024, 6, 1), Decimal::new(700, 0)),
            ]
        );
    }

    #[test]
    fn test_monthly_report_predicts_next_month() {
        let db = setup();
        add(&db, TransactionKind::Expense, "Alimentação", 100, date(2024, 3, 3));
        add(&db, TransactionKind::Expense, "Alimentação", 110, date(2024, 4, 3));
        add(&db, TransactionKind::Expense, "Alimentação", 121, date(2024, 5, 3));
        add(&db, TransactionKind::Expense, "Lazer", 50, date(2024, 5, 20));
        // After the reported month, so not part of its prediction
        add(&db, TransactionKind::Expense, "Alimentação", 9000, date(2024, 6, 3));

        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);

        let report = engine.monthly_report(2024, 5).unwrap();
        assert_eq!(report.prediction.forecasts.len(), 1);
        let food = &report.prediction.forecasts[0];
        assert_eq!(food.category, "Alimentação");
        assert_eq!(food.target_month, date(2024, 6, 1));
        assert!(food.estimate < Decimal::new(200, 0));
        assert_eq!(report.prediction.insufficient, vec!["Lazer".to_string()]);

        let december = engine.monthly_report(2023, 12).unwrap();
        assert!(december.prediction.forecasts.is_empty());
    }

    #[test]
    fn test_budget_plan() {
        let db = setup();
        for m in [4, 5, 6] {
            add(&db, TransactionKind::Income, "Salário", 4000, date(2024, m, 5));
            add(&db, TransactionKind::Expense, "Moradia", 1500, date(2024, m, 10));
            add(&db, TransactionKind::Expense, "Lazer", 1500, date(2024, m, 20));
        }

        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);
        let plan = engine.budget_plan(Some(3), now()).unwrap();

        assert_eq!(plan.suggestions, engine.budget_suggestions(Some(3), now()).unwrap());
        let summary = plan.summary;
        assert_eq!(summary.monthly_income, Decimal::new(4000, 0));
        assert_eq!(summary.essential, Decimal::new(1500, 0));
        assert_eq!(summary.non_essential, Decimal::new(1500, 0));
        assert_eq!(summary.savings, Decimal::new(1000, 0));
        assert!((summary.savings_rate - 25.0).abs() < 1e-9);
        assert_eq!(summary.ideal_non_essential, Decimal::new(1200, 0));
    }

    #[test]
    fn test_recurring_and_budget() {
        let db = setup();
        for (m, amount) in [(2, 100), (3, 102), (4, 98), (5, 100)] {
            add(&db, TransactionKind::Expense, "Lazer", amount, date(2024, m, 1));
        }
        add(&db, TransactionKind::Expense, "Alimentação", 600, date(2024, 5, 10));
        add(&db, TransactionKind::Expense, "Alimentação", 600, date(2024, 6, 10));

        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);

        let recurring = engine.recurring(None, now()).unwrap();
        assert_eq!(recurring.len(), 1);
        assert_eq!(recurring[0].category, "Lazer");
        assert_eq!(recurring[0].cadence, Cadence::Monthly);

        let budget = engine.budget_suggestions(None, now()).unwrap();
        let fun = budget.iter().find(|b| b.category == "Lazer").unwrap();
        assert_eq!(fun.basis, BudgetBasis::Recurring);
        assert_eq!(fun.amount, Decimal::new(100, 0));
        let food = budget.iter().find(|b| b.category == "Alimentação").unwrap();
        assert_eq!(food.basis, BudgetBasis::Average);
        // 1200 over six months, plus 10%
        assert_eq!(food.amount, Decimal::new(220, 0));
    }

    #[test]
    fn test_health_score_in_range() {
        let db = setup();
        for m in 1..=6 {
            add(&db, TransactionKind::Income, "Salário", 5000, date(2024, m, 5));
            add(&db, TransactionKind::Expense, "Moradia", 1500, date(2024, m, 10));
        }
        let config = Config::default();
        let engine = AnalyticsEngine::new(&db, &config);
        let score = engine.health_score(None, now()).unwrap();
        assert!((0.0..=100.0).contains(&score.score));
        assert!(score.score >= 80.0);
    }
}
