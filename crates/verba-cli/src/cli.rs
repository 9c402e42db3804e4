//! CLI argument definitions using clap
//!
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Verba - record and analyse your finances in plain Portuguese
#[derive(Parser)]
#[command(name = "verba")]
#[command(about = "Portuguese natural-language personal finance assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "verba.db", global = true)]
    pub db: PathBuf,

    /// Configuration file (defaults to $VERBA_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Interpret a sentence and execute it
    Say {
        /// The sentence, e.g. "gastei 50 reais no mercado"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Reference date (YYYY-MM-DD) used for relative dates
        #[arg(long)]
        now: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interpret a sentence without executing it
    Parse {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Reference date (YYYY-MM-DD) used for relative dates
        #[arg(long)]
        now: Option<String>,
    },

    /// Interactive prompt: one sentence per line, "sair" to quit
    Shell,

    /// Generate analytics reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,

        /// Months of history to analyse (defaults to the configured window)
        #[arg(long, global = true)]
        months: Option<u32>,

        /// Print the report as JSON
        #[arg(long, global = true)]
        json: bool,
    },

    /// List categories
    Categories {
        /// Only show one kind: despesa or receita
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// List recent transactions
    Transactions {
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Income, expenses and balance over all history
    Balance,

    /// Monthly report with category breakdown
    Monthly {
        /// Month to report (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },

    /// Spending trend per category
    Trends {
        #[arg(long)]
        category: Option<String>,
    },

    /// Next-month spending forecast
    Forecast {
        /// Forecast a single category instead of all of them
        #[arg(long)]
        category: Option<String>,
    },

    /// Detected recurring expenses
    Recurring,

    /// Financial health score
    Health,

    /// Suggested monthly budget per category
    Budget,
}
