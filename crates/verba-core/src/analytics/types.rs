//! Report types produced by the analytics engine

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::models::TransactionKind;

/// Income, expenses and balance up to a date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    /// Last day included; `None` means every transaction
    pub as_of: Option<NaiveDate>,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub transactions: usize,
}

/// Spend or income of one category within a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub kind: TransactionKind,
    pub total: Decimal,
    pub count: usize,
    /// Percentage of the period's total for the same kind
    pub share: f64,
}

/// A single large transaction called out in a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopExpense {
    pub id: String,
    pub date: NaiveDate,
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
}

/// Totals of the period immediately before a report's period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    /// Percent change vs. this period; `None` when the previous value was zero
    pub income_change: Option<f64>,
    pub expense_change: Option<f64>,
}

/// Summary of a period (usually a calendar month)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    /// Percent of income saved; zero without income
    pub savings_rate: f64,
    pub by_category: Vec<CategoryTotal>,
    pub top_expenses: Vec<TopExpense>,
    pub previous: PeriodComparison,
    pub message: String,
    pub transactions: usize,
    /// Expense forecasts for the month after the period
    pub prediction: ForecastSet,
}

/// Total for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthTotal {
    /// First day of the month
    pub month: NaiveDate,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Flat => "flat",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "em alta",
            TrendDirection::Falling => "em queda",
            TrendDirection::Flat => "estável",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of one category's monthly spend over the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub category: String,
    pub direction: TrendDirection,
    /// (last − mean) / mean, signed
    pub magnitude: f64,
    pub mean: Decimal,
    pub last: Decimal,
    pub series: Vec<MonthTotal>,
}

/// Direction of an overall money flow across the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowTrend {
    pub direction: TrendDirection,
    /// Absolute least-squares slope of the max-scaled series, in percent per month
    pub percentage: f64,
}

/// Income, expenses and balance of one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthFlow {
    /// First day of the month
    pub month: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

/// Trends of total income, total expenses and savings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallTrends {
    pub income: FlowTrend,
    pub expenses: FlowTrend,
    pub savings: FlowTrend,
    pub months: Vec<MonthFlow>,
}

/// Overall flows plus per-category expense trends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendsReport {
    pub overall: OverallTrends,
    pub categories: Vec<TrendReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Weekly,
    Monthly,
    Yearly,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
            Cadence::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Cadence::Weekly => "semanal",
            Cadence::Monthly => "mensal",
            Cadence::Yearly => "anual",
        }
    }

    /// Occurrences per month
    pub fn monthly_factor(&self) -> f64 {
        match self {
            Cadence::Weekly => 52.0 / 12.0,
            Cadence::Monthly => 1.0,
            Cadence::Yearly => 1.0 / 12.0,
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cluster of similar expenses at a regular cadence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringExpense {
    pub category: String,
    /// Most common description in the cluster, if any
    pub description: Option<String>,
    /// Median amount
    pub amount: Decimal,
    /// Median days between occurrences
    pub interval_days: f64,
    pub cadence: Cadence,
    pub occurrences: usize,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub next_expected: NaiveDate,
}

impl RecurringExpense {
    /// Amount normalized to one month
    pub fn monthly_amount(&self) -> f64 {
        crate::analytics::series::to_f64(self.amount) * self.cadence.monthly_factor()
    }
}

/// Next-month projection for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub category: String,
    /// First day of the month being projected
    pub target_month: NaiveDate,
    pub estimate: Decimal,
    pub lower: Decimal,
    pub upper: Decimal,
    pub trend: TrendDirection,
    /// Periods the history had (from the first active month)
    pub periods: usize,
    pub history: Vec<MonthTotal>,
}

/// Forecasts for several categories at once
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastSet {
    pub forecasts: Vec<Forecast>,
    /// Categories skipped for lack of history
    pub insufficient: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthGrade {
    Excelente,
    Boa,
    Regular,
    Preocupante,
    Critica,
}

impl HealthGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HealthGrade::Excelente
        } else if score >= 60.0 {
            HealthGrade::Boa
        } else if score >= 40.0 {
            HealthGrade::Regular
        } else if score >= 20.0 {
            HealthGrade::Preocupante
        } else {
            HealthGrade::Critica
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthGrade::Excelente => "Excelente",
            HealthGrade::Boa => "Boa",
            HealthGrade::Regular => "Regular",
            HealthGrade::Preocupante => "Preocupante",
            HealthGrade::Critica => "Crítica",
        }
    }
}

impl fmt::Display for HealthGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One term of the health score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthFactor {
    pub name: &'static str,
    /// Points added to (or removed from) the base score
    pub points: f64,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthScore {
    pub score: f64,
    pub grade: HealthGrade,
    pub factors: Vec<HealthFactor>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetBasis {
    /// Derived from a detected recurring expense
    Recurring,
    /// Trailing monthly average with a safety margin
    Average,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSuggestion {
    pub category: String,
    pub amount: Decimal,
    pub basis: BudgetBasis,
    pub monthly_average: Decimal,
}

/// Monthly averages of the window laid against the 50/30/20 rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub monthly_income: Decimal,
    /// Average monthly spend on essential categories
    pub essential: Decimal,
    pub non_essential: Decimal,
    /// Income left after both kinds of spend (negative when overspending)
    pub savings: Decimal,
    /// Percent of income saved; zero without income
    pub savings_rate: f64,
    pub ideal_essential: Decimal,
    pub ideal_non_essential: Decimal,
    pub ideal_savings: Decimal,
    pub message: String,
}

/// Per-category caps together with the 50/30/20 summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPlan {
    pub suggestions: Vec<BudgetSuggestion>,
    pub summary: BudgetSummary,
}

/// Any analytics result, as returned to a boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AnalyticsReport {
    Balance(Balance),
    MonthlyReport(MonthlyReport),
    Trends(TrendsReport),
    Forecast(ForecastSet),
    Recurring(Vec<RecurringExpense>),
    HealthScore(HealthScore),
    Budget(BudgetPlan),
}
