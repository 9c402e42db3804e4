//! Verba CLI
//!
//! Usage:
//!   verba init                                  # Initialize the database
//!   verba say gastei 50 reais no mercado        # Interpret and execute a sentence
//!   verba parse recebi 3000 de salário          # Show how a sentence is understood
//!   verba shell                                 # Interactive prompt
//!   verba report monthly --month 2024-06        # Monthly report
//!   verba report forecast --months 6            # Next-month forecast
//!   verba categories                            # List categories
//!   verba transactions --limit 10               # Recent transactions

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Say { text, now, json } => {
            let db = commands::open_db(&cli.db)?;
            let now = commands::parse_now(now.as_deref())?;
            commands::cmd_say(&db, &config, &text.join(" "), now, json)
        }
        Commands::Parse { text, now } => {
            let db = commands::open_db(&cli.db)?;
            let now = commands::parse_now(now.as_deref())?;
            commands::cmd_parse(&db, &config, &text.join(" "), now)
        }
        Commands::Shell => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_shell(&db, &config)
        }
        Commands::Report {
            report_type,
            months,
            json,
        } => {
            let db = commands::open_db(&cli.db)?;
            let now = commands::parse_now(None)?;
            let report = match report_type {
                ReportType::Balance => commands::report_balance(&db, &config),
                ReportType::Monthly { month } => {
                    commands::report_monthly(&db, &config, month.as_deref(), now)
                }
                ReportType::Trends { category } => {
                    commands::report_trends(&db, &config, category.as_deref(), months, now)
                }
                ReportType::Forecast { category } => {
                    commands::report_forecast(&db, &config, category.as_deref(), months, now)
                }
                ReportType::Recurring => commands::report_recurring(&db, &config, months, now),
                ReportType::Health => commands::report_health(&db, &config, months, now),
                ReportType::Budget => commands::report_budget(&db, &config, months, now),
            }?;
            commands::print_report(&report, json)
        }
        Commands::Categories { kind } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_categories(&db, kind.as_deref())
        }
        Commands::Transactions { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, limit)
        }
    }
}
