//! Database tests

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use super::*;
use crate::error::Error;
use crate::models::*;
use crate::store::Store;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded() -> Database {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories(now()).unwrap();
    db
}

fn add(db: &Database, kind: TransactionKind, category: &str, cents: i64, day: NaiveDate) -> Transaction {
    let category = db.find_category(category, kind).unwrap().unwrap();
    db.create_transaction(&NewTransaction {
        kind,
        amount: Decimal::new(cents, 2),
        category_id: category.id,
        description: Some(format!("{} {}", category.name, day)),
        date: day,
        created_at: now(),
    })
    .unwrap()
}

#[test]
fn test_in_memory_db_is_empty() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.count_transactions().unwrap(), 0);
    assert!(db.list_categories(None).unwrap().is_empty());
}

#[test]
fn test_seed_is_idempotent() {
    let db = Database::in_memory().unwrap();
    let first = db.seed_default_categories(now()).unwrap();
    assert_eq!(
        first,
        DEFAULT_EXPENSE_CATEGORIES.len() + DEFAULT_INCOME_CATEGORIES.len()
    );
    assert_eq!(db.seed_default_categories(now()).unwrap(), 0);

    let income = db.list_categories(Some(TransactionKind::Income)).unwrap();
    assert_eq!(income.len(), DEFAULT_INCOME_CATEGORIES.len());
    assert!(income.iter().all(|c| c.kind == TransactionKind::Income));
}

#[test]
fn test_find_category_ignores_accents_and_case() {
    let db = seeded();
    let found = db
        .find_category("ALIMENTACAO", TransactionKind::Expense)
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "Alimentação");

    // "Outros" exists for both kinds as separate categories
    let expense = db.find_category("outros", TransactionKind::Expense).unwrap().unwrap();
    let income = db.find_category("outros", TransactionKind::Income).unwrap().unwrap();
    assert_ne!(expense.id, income.id);
}

#[test]
fn test_duplicate_category_rejected() {
    let db = seeded();
    let result = db.create_category("saude", TransactionKind::Expense, now());
    assert!(matches!(result, Err(Error::Validation(_))));

    // Same name, other kind, is allowed
    let created = db.create_category("Saúde", TransactionKind::Income, now()).unwrap();
    assert_eq!(created.kind, TransactionKind::Income);
}

#[test]
fn test_transaction_crud() {
    let db = seeded();
    let tx = add(&db, TransactionKind::Expense, "Lazer", 4590, date(2024, 3, 1));
    assert_eq!(tx.category, "Lazer");
    assert_eq!(tx.amount, Decimal::new(4590, 2));

    let fetched = db.get_transaction(&tx.id).unwrap().unwrap();
    assert_eq!(fetched, tx);

    let updated = db
        .update_transaction(
            &tx.id,
            &TransactionChanges {
                amount: Some(Decimal::new(5000, 2)),
                description: Some("cinema".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.amount, Decimal::new(5000, 2));
    assert_eq!(updated.description.as_deref(), Some("cinema"));
    assert_eq!(updated.date, tx.date);

    db.delete_transaction(&tx.id).unwrap();
    assert!(db.get_transaction(&tx.id).unwrap().is_none());
}

#[test]
fn test_missing_transaction_errors() {
    let db = seeded();
    let result = db.delete_transaction("nope");
    assert!(matches!(result, Err(Error::TransactionNotFound { .. })));

    let result = db.update_transaction(
        "nope",
        &TransactionChanges {
            amount: Some(Decimal::ONE),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(Error::TransactionNotFound { .. })));
}

#[test]
fn test_category_kind_must_match() {
    let db = seeded();
    let salary = db.find_category("Salário", TransactionKind::Income).unwrap().unwrap();
    let result = db.create_transaction(&NewTransaction {
        kind: TransactionKind::Expense,
        amount: Decimal::ONE_HUNDRED,
        category_id: salary.id.clone(),
        description: None,
        date: date(2024, 3, 1),
        created_at: now(),
    });
    assert!(matches!(result, Err(Error::Validation(_))));

    let tx = add(&db, TransactionKind::Expense, "Moradia", 150000, date(2024, 3, 5));
    let result = db.update_transaction(
        &tx.id,
        &TransactionChanges {
            category_id: Some(salary.id),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(db.get_transaction(&tx.id).unwrap().unwrap().category, "Moradia");
}

#[test]
fn test_non_positive_amount_rejected() {
    let db = seeded();
    let category = db.find_category("Lazer", TransactionKind::Expense).unwrap().unwrap();
    let result = db.create_transaction(&NewTransaction {
        kind: TransactionKind::Expense,
        amount: Decimal::ZERO,
        category_id: category.id,
        description: None,
        date: date(2024, 3, 1),
        created_at: now(),
    });
    assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_amount_above_maximum_rejected() {
    let db = seeded();
    let category = db.find_category("Lazer", TransactionKind::Expense).unwrap().unwrap();
    let mut tx = NewTransaction {
        kind: TransactionKind::Expense,
        amount: MAX_AMOUNT + Decimal::new(1, 2),
        category_id: category.id,
        description: None,
        date: date(2024, 3, 1),
        created_at: now(),
    };
    let result = db.create_transaction(&tx);
    assert!(matches!(result, Err(Error::InvalidAmount { .. })));

    tx.amount = MAX_AMOUNT;
    let created = db.create_transaction(&tx).unwrap();
    let changes = TransactionChanges {
        amount: Some(MAX_AMOUNT * Decimal::from(2)),
        ..Default::default()
    };
    assert!(matches!(
        db.update_transaction(&created.id, &changes),
        Err(Error::InvalidAmount { .. })
    ));
    assert_eq!(db.get_transaction(&created.id).unwrap().unwrap().amount, MAX_AMOUNT);
}

#[test]
fn test_query_filters_are_conjunctive() {
    let db = seeded();
    add(&db, TransactionKind::Expense, "Alimentação", 5000, date(2024, 1, 10));
    add(&db, TransactionKind::Expense, "Alimentação", 7000, date(2024, 2, 10));
    add(&db, TransactionKind::Expense, "Lazer", 3000, date(2024, 2, 12));
    add(&db, TransactionKind::Income, "Salário", 500000, date(2024, 2, 5));

    let feb = (date(2024, 2, 1), date(2024, 2, 29));

    let all_feb = db
        .query_transactions(&TransactionFilter::new().date_range(Some(feb)))
        .unwrap();
    assert_eq!(all_feb.len(), 3);
    // Newest first
    assert_eq!(all_feb[0].date, date(2024, 2, 12));

    let food_feb = db
        .query_transactions(
            &TransactionFilter::new()
                .kind(Some(TransactionKind::Expense))
                .category(Some("alimentacao"))
                .date_range(Some(feb)),
        )
        .unwrap();
    assert_eq!(food_feb.len(), 1);
    assert_eq!(food_feb[0].amount, Decimal::new(7000, 2));

    let searched = db
        .query_transactions(&TransactionFilter::new().search(Some("lazer")))
        .unwrap();
    assert_eq!(searched.len(), 1);

    let limited = db.list_transactions(2).unwrap();
    assert_eq!(limited.len(), 2);
}

fn described(db: &Database, description: &str) -> Transaction {
    let category = db.find_category("Outros", TransactionKind::Expense).unwrap().unwrap();
    db.create_transaction(&NewTransaction {
        kind: TransactionKind::Expense,
        amount: Decimal::new(1000, 2),
        category_id: category.id,
        description: Some(description.to_string()),
        date: date(2024, 3, 1),
        created_at: now(),
    })
    .unwrap()
}

fn search(db: &Database, text: &str) -> Vec<String> {
    db.query_transactions(&TransactionFilter::new().search(Some(text)))
        .unwrap()
        .into_iter()
        .filter_map(|t| t.description)
        .collect()
}

#[test]
fn test_search_ignores_accents_and_treats_wildcards_literally() {
    let db = seeded();
    described(&db, "Almoço no centro");
    described(&db, "desconto 50% na loja");
    described(&db, "desconto 500 reais");
    described(&db, "conta_luz");
    described(&db, "contaXluz");

    assert_eq!(search(&db, "almoco"), vec!["Almoço no centro"]);
    assert_eq!(search(&db, "ALMOÇO"), vec!["Almoço no centro"]);
    assert_eq!(search(&db, "50%"), vec!["desconto 50% na loja"]);
    assert_eq!(search(&db, "conta_luz"), vec!["conta_luz"]);
    assert!(search(&db, "%").len() == 1);
}

#[test]
fn test_search_after_edit_uses_new_description() {
    let db = seeded();
    let tx = described(&db, "padaria");
    let changes = TransactionChanges {
        description: Some("Açaí".to_string()),
        ..Default::default()
    };
    db.update_transaction(&tx.id, &changes).unwrap();

    assert!(search(&db, "padaria").is_empty());
    assert_eq!(search(&db, "acai"), vec!["Açaí"]);
}

#[test]
fn test_older_schema_gains_search_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verba.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL,
                kind TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (name_key, kind)
            );
            CREATE TABLE transactions (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                amount TEXT NOT NULL,
                category_id TEXT NOT NULL REFERENCES categories(id),
                description TEXT,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            INSERT INTO categories VALUES ('c1', 'Outros', 'outros', 'expense', '2024-03-15T12:00:00+00:00');
            INSERT INTO transactions VALUES
                ('t1', 'expense', '12.50', 'c1', 'Pão de queijo', '2024-03-01', '2024-03-15T12:00:00+00:00');
            "#,
        )
        .unwrap();
    }

    let db = Database::new(&path.to_string_lossy()).unwrap();
    assert_eq!(search(&db, "pao"), vec!["Pão de queijo"]);
}

#[test]
fn test_reopen_preserves_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verba.db");
    let path = path.to_string_lossy().to_string();

    let id = {
        let db = Database::new(&path).unwrap();
        db.seed_default_categories(now()).unwrap();
        add(&db, TransactionKind::Income, "Freelance", 120050, date(2024, 3, 2)).id
    };

    let db = Database::new(&path).unwrap();
    let tx = db.get_transaction(&id).unwrap().unwrap();
    assert_eq!(tx.amount, Decimal::new(120050, 2));
    assert_eq!(tx.created_at, now());
}
