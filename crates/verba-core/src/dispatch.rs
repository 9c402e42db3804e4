//! Command dispatcher
//!
//! Maps each interpreted command to exactly one store operation or analytics
//! call. Update and delete check that the target exists before touching
//! anything, so a failed command leaves the store unchanged.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::analytics::{AnalyticsEngine, AnalyticsReport, ForecastSet};
use crate::config::Config;
use crate::db::TransactionFilter;
use crate::error::{Error, Result};
use crate::interpreter::{Intent, ParsedCommand, HELP_EXAMPLES};
use crate::models::{
    amount_in_range, Category, NewTransaction, Transaction, TransactionChanges, TransactionKind,
};
use crate::store::Store;
use crate::text::capitalize;

/// Outcome of an executed command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Response {
    Created(Transaction),
    Updated(Transaction),
    /// The transaction as it was before removal
    Deleted(Transaction),
    Listed(Vec<Transaction>),
    CategoryCreated(Category),
    Categories(Vec<Category>),
    Report(AnalyticsReport),
    Help(&'static [(&'static str, &'static str)]),
}

pub struct Dispatcher<'a> {
    store: &'a dyn Store,
    config: &'a Config,
}

impl<'a> Dispatcher<'a> {
    pub fn new(store: &'a dyn Store, config: &'a Config) -> Self {
        Self { store, config }
    }

    fn analytics(&self) -> AnalyticsEngine<'a> {
        AnalyticsEngine::new(self.store, self.config)
    }

    /// Execute a command; side effects happen at most once
    pub fn execute(&self, command: &ParsedCommand, now: DateTime<Utc>) -> Result<Response> {
        debug!(intent = %command.intent, "Dispatching command");
        let slots = &command.slots;

        match command.intent {
            Intent::AddExpense => self.add(command, TransactionKind::Expense, now),
            Intent::AddIncome => self.add(command, TransactionKind::Income, now),
            Intent::List => {
                let range = slots.date_range.map(|r| (r.start, r.end));
                let filter = TransactionFilter::new()
                    .kind(slots.kind)
                    .category(slots.category.as_deref())
                    .date_range(range)
                    .search(slots.description.as_deref());
                Ok(Response::Listed(self.store.query_transactions(&filter)?))
            }
            Intent::Update => self.update(command),
            Intent::Delete => {
                let id = required_id(command)?;
                let existing = self
                    .store
                    .get_transaction(id)?
                    .ok_or_else(|| Error::TransactionNotFound { id: id.to_string() })?;
                self.store.delete_transaction(id)?;
                Ok(Response::Deleted(existing))
            }
            Intent::AddCategory => {
                let name = slots
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        Error::Validation("informe o nome da nova categoria".to_string())
                    })?;
                let kind = slots.kind.unwrap_or(TransactionKind::Expense);
                let category = self.store.create_category(&capitalize(name), kind, now)?;
                Ok(Response::CategoryCreated(category))
            }
            Intent::ListCategories => Ok(Response::Categories(
                self.store.list_categories(slots.kind)?,
            )),
            Intent::Balance => Ok(Response::Report(AnalyticsReport::Balance(
                self.analytics().balance(slots.date)?,
            ))),
            Intent::Report => {
                let today = now.date_naive();
                let (start, end) = match slots.date_range {
                    Some(range) => (range.start, range.end),
                    None => crate::interpreter::normalize::month_of(today),
                };
                Ok(Response::Report(AnalyticsReport::MonthlyReport(
                    self.analytics().period_report(start, end)?,
                )))
            }
            Intent::Trends => Ok(Response::Report(AnalyticsReport::Trends(
                self.analytics()
                    .trends(slots.category.as_deref(), slots.window_months, now)?,
            ))),
            Intent::Forecast => {
                let engine = self.analytics();
                let set = match slots.category.as_deref() {
                    Some(category) => ForecastSet {
                        forecasts: vec![engine.forecast(category, slots.window_months, now)?],
                        insufficient: Vec::new(),
                    },
                    None => engine.forecast_all(slots.window_months, now)?,
                };
                Ok(Response::Report(AnalyticsReport::Forecast(set)))
            }
            Intent::Recurring => Ok(Response::Report(AnalyticsReport::Recurring(
                self.analytics().recurring(slots.window_months, now)?,
            ))),
            Intent::HealthScore => Ok(Response::Report(AnalyticsReport::HealthScore(
                self.analytics().health_score(slots.window_months, now)?,
            ))),
            Intent::Budget => Ok(Response::Report(AnalyticsReport::Budget(
                self.analytics().budget_plan(slots.window_months, now)?,
            ))),
            Intent::Help => Ok(Response::Help(HELP_EXAMPLES)),
        }
    }

    /// Category of `kind` by name, created when missing
    fn category_for_add(
        &self,
        name: &str,
        kind: TransactionKind,
        now: DateTime<Utc>,
    ) -> Result<Category> {
        match self.store.find_category(name, kind)? {
            Some(category) => Ok(category),
            None => {
                debug!(name = %name, kind = %kind, "Creating category for new transaction");
                self.store.create_category(&capitalize(name), kind, now)
            }
        }
    }

    fn add(
        &self,
        command: &ParsedCommand,
        kind: TransactionKind,
        now: DateTime<Utc>,
    ) -> Result<Response> {
        let slots = &command.slots;
        let amount = slots.amount.ok_or_else(|| Error::MissingAmount {
            intent: command.intent.label().to_string(),
        })?;
        if !amount_in_range(amount) {
            return Err(Error::InvalidAmount {
                value: amount.to_string(),
            });
        }

        let name = slots
            .category
            .as_deref()
            .unwrap_or(&self.config.interpreter.default_category);
        let category = self.category_for_add(name, kind, now)?;

        let transaction = self.store.create_transaction(&NewTransaction {
            kind,
            amount,
            category_id: category.id,
            description: slots.description.clone(),
            date: slots.date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
        })?;
        Ok(Response::Created(transaction))
    }

    fn update(&self, command: &ParsedCommand) -> Result<Response> {
        let slots = &command.slots;
        let id = required_id(command)?;
        let existing = self
            .store
            .get_transaction(id)?
            .ok_or_else(|| Error::TransactionNotFound { id: id.to_string() })?;

        let category_id = match slots.category.as_deref() {
            Some(name) => Some(
                self.store
                    .find_category(name, existing.kind)?
                    .ok_or_else(|| Error::CategoryNotFound {
                        name: name.to_string(),
                    })?
                    .id,
            ),
            None => None,
        };
        let changes = TransactionChanges {
            amount: slots.amount,
            category_id,
            description: slots.description.clone(),
            date: slots.date,
        };
        if changes.is_empty() {
            return Err(Error::Validation(
                "nada para atualizar: informe valor, categoria, descrição ou data".to_string(),
            ));
        }

        Ok(Response::Updated(
            self.store.update_transaction(&existing.id, &changes)?,
        ))
    }
}

fn required_id(command: &ParsedCommand) -> Result<&str> {
    command
        .slots
        .transaction_id
        .as_deref()
        .ok_or_else(|| Error::MissingIdentifier {
            intent: command.intent.label().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::Database;
    use crate::interpreter::Interpreter;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn setup() -> (Database, Config) {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories(now()).unwrap();
        (db, Config::default())
    }

    fn run(db: &Database, config: &Config, text: &str) -> Result<Response> {
        let interpreter = Interpreter::new(config.interpreter.clone())
            .with_categories(db.list_categories(None)?);
        let command = interpreter.interpret(text, now())?;
        Dispatcher::new(db, config).execute(&command, now())
    }

    fn created(response: Response) -> Transaction {
        match response {
            Response::Created(tx) => tx,
            other => panic!("expected Created, got {:?}", other),
        }
    }

    #[test]
    fn test_add_expense_creates_transaction() {
        let (db, config) = setup();
        let tx = created(run(&db, &config, "adicionar despesa de R$ 50 em Alimentação").unwrap());
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.amount, Decimal::new(5000, 2));
        assert_eq!(tx.category, "Alimentação");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(tx.created_at, now());
        assert_eq!(db.count_transactions().unwrap(), 1);
    }

    #[test]
    fn test_add_creates_missing_category_of_same_kind() {
        let (db, config) = setup();
        let tx = created(run(&db, &config, "gastei 30 em ração").unwrap());
        assert_eq!(tx.category, "Ração");
        let category = db
            .find_category("racao", TransactionKind::Expense)
            .unwrap()
            .unwrap();
        assert_eq!(category.kind, TransactionKind::Expense);
        assert!(db
            .find_category("racao", TransactionKind::Income)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_and_delete_missing_id() {
        let (db, config) = setup();
        created(run(&db, &config, "adicionar despesa de 10 em lazer").unwrap());

        let result = run(&db, &config, "alterar transação id naoexiste valor 20");
        assert!(matches!(result, Err(Error::TransactionNotFound { .. })));
        let result = run(&db, &config, "excluir transação id naoexiste");
        assert!(matches!(result, Err(Error::TransactionNotFound { .. })));

        let all = db.list_transactions(10).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, Decimal::new(1000, 2));
    }

    #[test]
    fn test_update_applies_changes() {
        let (db, config) = setup();
        let tx = created(run(&db, &config, "adicionar despesa de 10 em lazer").unwrap());

        let response = run(
            &db,
            &config,
            &format!("alterar transação id {} valor 25,90 categoria alimentação", tx.id),
        )
        .unwrap();
        let Response::Updated(updated) = response else {
            panic!("expected Updated");
        };
        assert_eq!(updated.amount, Decimal::new(2590, 2));
        assert_eq!(updated.category, "Alimentação");
    }

    #[test]
    fn test_empty_update_is_validation_error() {
        let (db, config) = setup();
        let tx = created(run(&db, &config, "adicionar despesa de 10 em lazer").unwrap());
        let result = run(&db, &config, &format!("alterar transação id {}", tx.id));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_delete_returns_removed_transaction() {
        let (db, config) = setup();
        let tx = created(run(&db, &config, "adicionar despesa de 10 em lazer").unwrap());
        let response = run(&db, &config, &format!("excluir transação id {}", tx.id)).unwrap();
        assert_eq!(response, Response::Deleted(tx));
        assert_eq!(db.count_transactions().unwrap(), 0);
    }

    #[test]
    fn test_list_is_conjunctive() {
        let (db, config) = setup();
        run(&db, &config, "gastei 50 no mercado ontem").unwrap();
        run(&db, &config, "gastei 80 em lazer ontem").unwrap();
        run(&db, &config, "recebi 3000 de salário").unwrap();
        run(&db, &config, "gastei 40 no mercado em 10/01").unwrap();

        let Response::Listed(found) =
            run(&db, &config, "listar despesas de alimentação este mês").unwrap()
        else {
            panic!("expected Listed");
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].amount, Decimal::new(5000, 2));
    }

    #[test]
    fn test_categories() {
        let (db, config) = setup();
        let response = run(&db, &config, "criar categoria pets").unwrap();
        let Response::CategoryCreated(category) = response else {
            panic!("expected CategoryCreated");
        };
        assert_eq!(category.name, "Pets");

        let result = run(&db, &config, "criar categoria Pets");
        assert!(matches!(result, Err(Error::Validation(_))));

        let Response::Categories(income) = run(&db, &config, "listar categorias de receita").unwrap()
        else {
            panic!("expected Categories");
        };
        assert!(income.iter().all(|c| c.kind == TransactionKind::Income));
    }

    #[test]
    fn test_analytics_and_help() {
        let (db, config) = setup();
        run(&db, &config, "recebi 3000 de salário").unwrap();

        let response = run(&db, &config, "qual o meu saldo").unwrap();
        let Response::Report(AnalyticsReport::Balance(balance)) = response else {
            panic!("expected balance");
        };
        assert_eq!(balance.balance, Decimal::new(3000, 0));

        assert!(matches!(
            run(&db, &config, "relatório"),
            Ok(Response::Report(AnalyticsReport::MonthlyReport(_)))
        ));
        assert!(matches!(
            run(&db, &config, "minha saúde financeira"),
            Ok(Response::Report(AnalyticsReport::HealthScore(_)))
        ));
        assert!(matches!(run(&db, &config, "ajuda"), Ok(Response::Help(_))));
    }
}
