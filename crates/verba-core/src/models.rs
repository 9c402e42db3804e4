//! Data models for Verba

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether money left or entered the household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// Portuguese label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Expense => "despesa",
            Self::Income => "receita",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match crate::text::fold(s).trim() {
            "expense" | "despesa" | "despesas" => Ok(Self::Expense),
            "income" | "receita" | "receitas" => Ok(Self::Income),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded transaction
///
/// `amount` is always a positive magnitude; direction comes from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category_id: String,
    /// Category name, denormalized for display
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with the sign implied by the kind (expenses negative)
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Expense => -self.amount,
            TransactionKind::Income => self.amount,
        }
    }
}

/// Input for creating a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category_id: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Fields to change on an existing transaction; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    pub amount: Option<Decimal>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl TransactionChanges {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

/// A transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

/// Categories created by `seed_default_categories`
pub const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &[
    "Alimentação",
    "Transporte",
    "Moradia",
    "Saúde",
    "Educação",
    "Lazer",
    "Trabalho",
    "Outros",
];

pub const DEFAULT_INCOME_CATEGORIES: &[&str] =
    &["Salário", "Investimentos", "Freelance", "Outros"];

/// Largest amount a single transaction may carry: R$ 1.000.000.000.000,00
///
/// Keeps every sum over stored transactions far from `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0); // 1_000_000_000_000

/// Round a money amount to cents
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// Whether a (rounded) amount is acceptable for a transaction
pub fn amount_in_range(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= MAX_AMOUNT
}

/// Generate a fresh opaque identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
