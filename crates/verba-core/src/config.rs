//! Interpreter and analytics configuration
//!
//! Every threshold the interpreter and the analytics engine use lives here and
//! is passed into them explicitly. Configuration is read from TOML; any field
//! left out of the file keeps its default.
//!
//! ```toml
//! [interpreter]
//! default_category = "Outros"
//!
//! [interpreter.expense_synonyms]
//! "Alimentação" = ["mercado", "padaria"]
//!
//! [analytics]
//! lookback_months = 12
//!
//! [analytics.recurrence]
//! amount_tolerance = 0.10
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::TransactionKind;
use crate::text::category_key;

/// Environment variable pointing at a config file
pub const CONFIG_ENV: &str = "VERBA_CONFIG";

/// Longest analytics window, in months (a century)
pub const MAX_LOOKBACK_MONTHS: u32 = 1200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub interpreter: InterpreterConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Category used when an add command names none; also counts as
    /// "uncategorized" for the health score
    pub default_category: String,
    /// Canonical expense category -> words that refer to it
    pub expense_synonyms: BTreeMap<String, Vec<String>>,
    /// Canonical income category -> words that refer to it
    pub income_synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        fn table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
            entries
                .iter()
                .map(|(name, words)| {
                    (
                        name.to_string(),
                        words.iter().map(|w| w.to_string()).collect(),
                    )
                })
                .collect()
        }

        Self {
            default_category: "Outros".to_string(),
            expense_synonyms: table(&[
                (
                    "Alimentação",
                    &[
                        "comida", "refeição", "restaurante", "supermercado", "mercado",
                        "lanche", "almoço", "jantar", "café", "padaria", "feira",
                    ],
                ),
                (
                    "Transporte",
                    &[
                        "uber", "táxi", "ônibus", "metrô", "combustível", "gasolina",
                        "passagem", "estacionamento", "pedágio", "carro", "moto",
                    ],
                ),
                (
                    "Moradia",
                    &[
                        "aluguel", "condomínio", "água", "luz", "energia", "gás",
                        "internet", "telefone", "iptu", "reforma", "casa",
                    ],
                ),
                (
                    "Saúde",
                    &[
                        "médico", "hospital", "farmácia", "remédio", "consulta", "exame",
                        "plano de saúde", "dentista", "psicólogo", "terapia",
                    ],
                ),
                (
                    "Educação",
                    &[
                        "escola", "faculdade", "curso", "livro", "material escolar",
                        "mensalidade", "matrícula", "universidade", "aula",
                    ],
                ),
                (
                    "Lazer",
                    &[
                        "cinema", "teatro", "show", "viagem", "passeio", "bar", "festa",
                        "academia", "assinatura", "streaming", "netflix",
                    ],
                ),
                ("Trabalho", &["material de escritório", "equipamento"]),
                ("Outros", &["diversos", "geral", "variado"]),
            ]),
            income_synonyms: table(&[
                (
                    "Salário",
                    &[
                        "contracheque", "salário", "remuneração", "ordenado",
                        "pró-labore",
                    ],
                ),
                (
                    "Investimentos",
                    &[
                        "aplicação", "rendimento", "dividendo", "dividendos", "juros",
                        "tesouro", "renda fixa",
                    ],
                ),
                ("Freelance", &["freela", "freelance", "projeto", "cliente"]),
            ]),
        }
    }
}

impl InterpreterConfig {
    fn table(&self, kind: TransactionKind) -> &BTreeMap<String, Vec<String>> {
        match kind {
            TransactionKind::Expense => &self.expense_synonyms,
            TransactionKind::Income => &self.income_synonyms,
        }
    }

    /// Resolve a phrase to its canonical category name, if it is a known synonym
    pub fn resolve_synonym(&self, phrase: &str, kind: TransactionKind) -> Option<&str> {
        let key = category_key(phrase);
        self.table(kind).iter().find_map(|(name, words)| {
            (category_key(name) == key || words.iter().any(|w| category_key(w) == key))
                .then_some(name.as_str())
        })
    }

    /// All (folded phrase, canonical name) pairs for a kind, longest phrase
    /// first. The canonical names themselves are included.
    pub fn synonym_phrases(&self, kind: TransactionKind) -> Vec<(String, &str)> {
        let mut phrases: Vec<(String, &str)> = self
            .table(kind)
            .iter()
            .flat_map(|(name, words)| {
                std::iter::once(name)
                    .chain(words.iter())
                    .map(move |w| (category_key(w), name.as_str()))
            })
            .collect();
        phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        phrases.dedup();
        phrases
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Complete calendar months before the current one that analytics look at
    pub lookback_months: u32,
    /// Relative change above which a trend is rising (and below the negative, falling)
    pub trend_threshold: f64,
    pub recurrence: RecurrenceConfig,
    pub forecast: ForecastConfig,
    pub health: HealthConfig,
    pub budget: BudgetConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            lookback_months: 6,
            trend_threshold: 0.10,
            recurrence: RecurrenceConfig::default(),
            forecast: ForecastConfig::default(),
            health: HealthConfig::default(),
            budget: BudgetConfig::default(),
        }
    }
}

/// Recurring expense detection thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceConfig {
    /// Max relative difference from the cluster median for amounts to group
    pub amount_tolerance: f64,
    pub min_occurrences: usize,
    pub weekly_days: i64,
    pub weekly_tolerance: i64,
    pub monthly_days: i64,
    pub monthly_tolerance: i64,
    pub yearly_days: i64,
    pub yearly_tolerance: i64,
    /// Share of intervals that must fit the cadence
    pub interval_consistency: f64,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: 0.15,
            min_occurrences: 3,
            weekly_days: 7,
            weekly_tolerance: 2,
            monthly_days: 30,
            monthly_tolerance: 3,
            yearly_days: 365,
            yearly_tolerance: 10,
            interval_consistency: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Periods in the weighted moving average (K)
    pub periods: usize,
    /// Fewest historical periods a forecast accepts
    pub min_history: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            periods: 3,
            min_history: 2,
        }
    }
}

/// Health score weights; each factor is bounded by its max
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub base: f64,
    pub savings_max: f64,
    /// Savings rate that earns the full savings credit
    pub target_savings_rate: f64,
    pub growth_max: f64,
    pub uncategorized_max: f64,
    pub recurring_max: f64,
    /// Recurring spend / income ratio above which the penalty starts
    pub recurring_ratio_limit: f64,
    pub reserve_max: f64,
    /// Months of expenses covered by the balance that earn the full reserve credit
    pub target_reserve_months: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            base: 50.0,
            savings_max: 20.0,
            target_savings_rate: 0.20,
            growth_max: 30.0,
            uncategorized_max: 10.0,
            recurring_max: 10.0,
            recurring_ratio_limit: 0.5,
            reserve_max: 10.0,
            target_reserve_months: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Recurring budgets are rounded up to a multiple of this (in reais)
    pub granularity: u32,
    /// Multiplier applied to the trailing average of non-recurring categories
    pub safety_margin: f64,
    /// Expense categories counted as needs; every other one is a want
    pub essential_categories: Vec<String>,
    /// Shares of income for needs, wants and savings
    pub needs_share: f64,
    pub wants_share: f64,
    pub savings_share: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            granularity: 10,
            safety_margin: 1.1,
            essential_categories: ["Moradia", "Alimentação", "Transporte", "Saúde", "Educação"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            needs_share: 0.5,
            wants_share: 0.3,
            savings_share: 0.2,
        }
    }
}

impl BudgetConfig {
    pub fn is_essential(&self, category: &str) -> bool {
        let key = category_key(category);
        self.essential_categories
            .iter()
            .any(|c| category_key(c) == key)
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default location: `<config dir>/verba/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("verba").join("config.toml"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Otherwise `VERBA_CONFIG` is tried, then
    /// the default location; if neither points at a file the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_file(path);
        }

        let candidate = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        match candidate {
            Some(path) if path.exists() => Self::load_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loading config");
        Self::from_toml_str(&content)
    }

    /// Reject values the analytics engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let a = &self.analytics;
        let invalid = |msg: &str| Err(Error::InvalidData(msg.to_string()));

        if self.interpreter.default_category.trim().is_empty() {
            return invalid("interpreter.default_category must not be empty");
        }
        if a.lookback_months == 0 {
            return invalid("analytics.lookback_months must be at least 1");
        }
        if a.lookback_months > MAX_LOOKBACK_MONTHS {
            return invalid("analytics.lookback_months must be at most 1200");
        }
        if a.trend_threshold.is_nan() || a.trend_threshold < 0.0 {
            return invalid("analytics.trend_threshold must be non-negative");
        }
        if !(0.0..1.0).contains(&a.recurrence.amount_tolerance) || a.recurrence.amount_tolerance == 0.0 {
            return invalid("analytics.recurrence.amount_tolerance must be between 0 and 1");
        }
        if a.recurrence.min_occurrences < 2 {
            return invalid("analytics.recurrence.min_occurrences must be at least 2");
        }
        if a.forecast.periods == 0 {
            return invalid("analytics.forecast.periods must be at least 1");
        }
        if a.forecast.min_history < 2 {
            return invalid("analytics.forecast.min_history must be at least 2");
        }
        if a.budget.granularity == 0 {
            return invalid("analytics.budget.granularity must be at least 1");
        }
        if a.budget.safety_margin.is_nan() || a.budget.safety_margin <= 0.0 {
            return invalid("analytics.budget.safety_margin must be positive");
        }
        let shares = [a.budget.needs_share, a.budget.wants_share, a.budget.savings_share];
        if shares.iter().any(|s| !(0.0..=1.0).contains(s))
            || (shares.iter().sum::<f64>() - 1.0).abs() > 1e-6
        {
            return invalid("analytics.budget shares must be between 0 and 1 and add up to 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.interpreter.default_category, "Outros");
        assert_eq!(config.analytics.lookback_months, 6);
        assert_eq!(config.analytics.recurrence.monthly_tolerance, 3);
        assert_eq!(config.analytics.forecast.periods, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [analytics]
            lookback_months = 12

            [analytics.budget]
            granularity = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.analytics.lookback_months, 12);
        assert_eq!(config.analytics.budget.granularity, 50);
        assert_eq!(config.analytics.budget.safety_margin, 1.1);
        assert_eq!(config.analytics.trend_threshold, 0.10);
        assert_eq!(config.interpreter.default_category, "Outros");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = Config::from_toml_str("[analytics]\nlookback_months = 0\n");
        assert!(matches!(result, Err(Error::InvalidData(_))));

        let result = Config::from_toml_str("[analytics.forecast]\nmin_history = 1\n");
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_budget_shares_must_add_up() {
        let result = Config::from_toml_str("[analytics.budget]\nneeds_share = 0.6\n");
        assert!(matches!(result, Err(Error::InvalidData(_))));

        let config = Config::from_toml_str(
            "[analytics.budget]\nneeds_share = 0.6\nwants_share = 0.2\n",
        )
        .unwrap();
        assert_eq!(config.analytics.budget.savings_share, 0.2);
        assert!(config.analytics.budget.is_essential("saude"));
        assert!(!config.analytics.budget.is_essential("Lazer"));
    }

    #[test]
    fn test_lookback_upper_bound() {
        let config = Config::from_toml_str("[analytics]\nlookback_months = 1200\n").unwrap();
        assert_eq!(config.analytics.lookback_months, MAX_LOOKBACK_MONTHS);

        let result = Config::from_toml_str("[analytics]\nlookback_months = 4294967295\n");
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml_str("[analytics\nlookback_months = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verba.toml");
        fs::write(&path, "[interpreter]\ndefault_category = \"Diversos\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.interpreter.default_category, "Diversos");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(Error::Io(_))));
    }

    #[test]
    fn test_resolve_synonym() {
        let config = InterpreterConfig::default();
        assert_eq!(
            config.resolve_synonym("Mercado", TransactionKind::Expense),
            Some("Alimentação")
        );
        assert_eq!(
            config.resolve_synonym("alimentacao", TransactionKind::Expense),
            Some("Alimentação")
        );
        assert_eq!(
            config.resolve_synonym("dividendos", TransactionKind::Income),
            Some("Investimentos")
        );
        assert_eq!(config.resolve_synonym("mercado", TransactionKind::Income), None);
        assert_eq!(config.resolve_synonym("Pets", TransactionKind::Expense), None);
    }

    #[test]
    fn test_synonym_phrases_longest_first() {
        let config = InterpreterConfig::default();
        let phrases = config.synonym_phrases(TransactionKind::Expense);
        let plano = phrases.iter().position(|(p, _)| p == "plano de saude").unwrap();
        let bar = phrases.iter().position(|(p, _)| p == "bar").unwrap();
        assert!(plano < bar);
        assert!(phrases
            .iter()
            .any(|(p, name)| p == "alimentacao" && *name == "Alimentação"));
    }
}
