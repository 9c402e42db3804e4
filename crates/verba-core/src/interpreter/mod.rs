//! Natural-language command interpreter
//!
//! Turns a Portuguese sentence into a [`ParsedCommand`] in three steps:
//! normalization (literals become placeholder tokens), rule-based intent
//! classification, and per-intent slot extraction. Interpretation is pure:
//! the same text and `now` always produce the same command.

pub mod normalize;
pub mod rules;
pub mod slots;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::InterpreterConfig;
use crate::error::{Error, Result};
use crate::models::Category;

pub use normalize::{normalize, parse_amount, Literal, NormalizedText};
pub use rules::{classify, Classification};
pub use slots::{DateRange, Slots};

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AddExpense,
    AddIncome,
    List,
    Balance,
    Report,
    Update,
    Delete,
    AddCategory,
    ListCategories,
    Trends,
    Forecast,
    Recurring,
    HealthScore,
    Budget,
    Help,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddExpense => "add_expense",
            Self::AddIncome => "add_income",
            Self::List => "list",
            Self::Balance => "balance",
            Self::Report => "report",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::AddCategory => "add_category",
            Self::ListCategories => "list_categories",
            Self::Trends => "trends",
            Self::Forecast => "forecast",
            Self::Recurring => "recurring",
            Self::HealthScore => "health_score",
            Self::Budget => "budget",
            Self::Help => "help",
        }
    }

    /// Portuguese name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddExpense => "adicionar despesa",
            Self::AddIncome => "adicionar receita",
            Self::List => "listar transações",
            Self::Balance => "saldo",
            Self::Report => "relatório",
            Self::Update => "atualizar transação",
            Self::Delete => "excluir transação",
            Self::AddCategory => "criar categoria",
            Self::ListCategories => "listar categorias",
            Self::Trends => "tendências",
            Self::Forecast => "previsão",
            Self::Recurring => "despesas recorrentes",
            Self::HealthScore => "saúde financeira",
            Self::Budget => "sugestão de orçamento",
            Self::Help => "ajuda",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully interpreted command, ready for dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCommand {
    pub intent: Intent,
    pub slots: Slots,
    /// More than one rule matched; `intent` is the first in rule order
    pub ambiguous: bool,
    /// 1.0 for a unique match, 1/n when n intents matched
    pub confidence: f64,
}

/// Example sentences shown by the help command
pub const HELP_EXAMPLES: &[(&str, &str)] = &[
    ("Adicionar despesa", "adicionar despesa de R$ 50 em Alimentação"),
    ("Adicionar despesa com data", "gastei 120,50 no mercado ontem"),
    ("Adicionar receita", "registrar receita de R$ 2.000,00 como Salário"),
    ("Listar transações", "listar despesas de janeiro"),
    ("Filtrar por período", "mostrar gastos de 01/02 até 15/02"),
    ("Saldo", "qual o meu saldo"),
    ("Relatório mensal", "balanço de janeiro"),
    ("Atualizar transação", "alterar transação id <id> valor 80"),
    ("Excluir transação", "excluir transação id <id>"),
    ("Criar categoria", "criar categoria Pets"),
    ("Listar categorias", "listar categorias de receita"),
    ("Tendências", "tendência de gastos nos últimos 6 meses"),
    ("Previsão", "previsão de gastos com alimentação"),
    ("Recorrentes", "mostrar despesas recorrentes"),
    ("Saúde financeira", "minha saúde financeira"),
    ("Orçamento", "sugerir orçamento"),
];

/// Rule-based interpreter
///
/// Holds the synonym configuration and, optionally, the known category
/// catalog. With a catalog, category phrases resolve to catalog names first
/// and updates to unknown categories are rejected.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
    catalog: Vec<Category>,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self {
            config,
            catalog: Vec::new(),
        }
    }

    pub fn with_categories(mut self, catalog: Vec<Category>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Interpret one sentence
    pub fn interpret(&self, text: &str, now: DateTime<Utc>) -> Result<ParsedCommand> {
        let today = now.date_naive();
        let normalized = normalize(text, today);

        let classification = classify(&normalized).ok_or_else(|| Error::UnrecognizedIntent {
            text: text.trim().to_string(),
        })?;

        let ctx = slots::SlotContext {
            config: &self.config,
            catalog: &self.catalog,
            today,
        };
        let slots = slots::extract(&normalized, classification.intent, &ctx)?;

        let candidates = classification.candidates.len().max(1);
        if classification.is_ambiguous() {
            debug!(
                intent = %classification.intent,
                candidates = candidates,
                "Ambiguous command, using first matching rule"
            );
        }
        debug!(intent = %classification.intent, "Interpreted command");

        Ok(ParsedCommand {
            intent: classification.intent,
            slots,
            ambiguous: classification.is_ambiguous(),
            confidence: 1.0 / candidates as f64,
        })
    }
}
