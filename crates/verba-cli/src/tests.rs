//! CLI command tests

use std::io::Cursor;

use chrono::{DateTime, TimeZone, Utc};
use verba_core::config::Config;
use verba_core::db::Database;
use verba_core::Store;

use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories(now()).unwrap();
    db
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap()
}

fn record(db: &Database, config: &Config, sentences: &[&str]) {
    for text in sentences {
        commands::cmd_say(db, config, text, now(), false).unwrap();
    }
}

// ========== Core Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verba.db");

    assert!(commands::cmd_init(&path).is_ok());
    assert!(path.exists());

    let db = commands::open_db(&path).unwrap();
    assert!(!db.list_categories(None).unwrap().is_empty());

    // Running init twice is harmless
    assert!(commands::cmd_init(&path).is_ok());
}

#[test]
fn test_parse_now() {
    let parsed = commands::parse_now(Some("2024-03-15")).unwrap();
    assert_eq!(parsed.date_naive().to_string(), "2024-03-15");

    assert!(commands::parse_now(Some("15/03/2024")).is_err());
    assert!(commands::parse_now(None).is_ok());
}

#[test]
fn test_load_config_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(commands::load_config(Some(&missing)).is_err());
}

// ========== Interpret Command Tests ==========

#[test]
fn test_cmd_say_records_transaction() {
    let db = setup_test_db();
    let config = Config::default();

    let result = commands::cmd_say(&db, &config, "gastei 50 reais no mercado", now(), false);
    assert!(result.is_ok());
    assert_eq!(db.count_transactions().unwrap(), 1);
}

#[test]
fn test_cmd_say_json() {
    let db = setup_test_db();
    let config = Config::default();

    let result = commands::cmd_say(&db, &config, "qual o meu saldo", now(), true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_say_reports_errors() {
    let db = setup_test_db();
    let config = Config::default();

    assert!(commands::cmd_say(&db, &config, "bom dia", now(), false).is_err());
    assert!(commands::cmd_say(&db, &config, "adicionar despesa em lazer", now(), false).is_err());
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_cmd_parse_does_not_execute() {
    let db = setup_test_db();
    let config = Config::default();

    let result = commands::cmd_parse(&db, &config, "recebi 3000 de salário", now());
    assert!(result.is_ok());
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_shell_continues_after_errors() {
    let db = setup_test_db();
    let config = Config::default();

    let input = Cursor::new("gastei 10 no mercado\nbom dia\n\ngastei 20 no mercado\nsair\ngastei 30 no mercado\n");
    let result = commands::run_shell(&db, &config, input);
    assert!(result.is_ok());

    // The failing line is skipped, everything after "sair" is ignored
    assert_eq!(db.count_transactions().unwrap(), 2);
}

#[test]
fn test_shell_stops_at_eof() {
    let db = setup_test_db();
    let config = Config::default();

    let result = commands::run_shell(&db, &config, Cursor::new("ajuda\n"));
    assert!(result.is_ok());
}

// ========== Report Command Tests ==========

#[test]
fn test_parse_month() {
    assert_eq!(commands::parse_month("2024-06").unwrap(), (2024, 6));
    assert!(commands::parse_month("junho").is_err());
    assert!(commands::parse_month("2024-xx").is_err());
}

#[test]
fn test_reports_on_empty_database() {
    let db = setup_test_db();
    let config = Config::default();

    assert!(commands::report_balance(&db, &config).is_ok());
    assert!(commands::report_monthly(&db, &config, None, now()).is_ok());
    assert!(commands::report_trends(&db, &config, None, None, now()).is_ok());
    assert!(commands::report_forecast(&db, &config, None, None, now()).is_ok());
    assert!(commands::report_recurring(&db, &config, None, now()).is_ok());
    assert!(commands::report_health(&db, &config, None, now()).is_ok());
    assert!(commands::report_budget(&db, &config, None, now()).is_ok());
}

#[test]
fn test_reports_render() {
    let db = setup_test_db();
    let config = Config::default();
    record(
        &db,
        &config,
        &[
            "recebi 4000 de salário",
            "gastei 300 no mercado",
            "paguei 1200 em moradia",
        ],
    );

    let report = commands::report_monthly(&db, &config, Some("2024-06"), now()).unwrap();
    assert!(commands::print_report(&report, false).is_ok());
    assert!(commands::print_report(&report, true).is_ok());

    let report = commands::report_health(&db, &config, Some(3), now()).unwrap();
    assert!(commands::print_report(&report, false).is_ok());

    let report = commands::report_trends(&db, &config, None, Some(3), now()).unwrap();
    assert!(commands::print_report(&report, false).is_ok());

    let report = commands::report_budget(&db, &config, None, now()).unwrap();
    assert!(commands::print_report(&report, false).is_ok());
    assert!(commands::print_report(&report, true).is_ok());
}

#[test]
fn test_report_monthly_invalid_month() {
    let db = setup_test_db();
    let config = Config::default();

    assert!(commands::report_monthly(&db, &config, Some("2024-13"), now()).is_err());
}

#[test]
fn test_report_forecast_single_category_needs_history() {
    let db = setup_test_db();
    let config = Config::default();

    let result = commands::report_forecast(&db, &config, Some("Alimentação"), None, now());
    assert!(result.is_err());
}

// ========== Listing Command Tests ==========

#[test]
fn test_cmd_categories() {
    let db = setup_test_db();

    assert!(commands::cmd_categories(&db, None).is_ok());
    assert!(commands::cmd_categories(&db, Some("receita")).is_ok());
    assert!(commands::cmd_categories(&db, Some("outra")).is_err());
}

#[test]
fn test_cmd_transactions_list() {
    let db = setup_test_db();
    let config = Config::default();

    assert!(commands::cmd_transactions_list(&db, 10).is_ok());

    record(&db, &config, &["gastei 50 no mercado"]);
    assert!(commands::cmd_transactions_list(&db, 10).is_ok());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("Alimentação e bebidas", 10), "Aliment...");
}
