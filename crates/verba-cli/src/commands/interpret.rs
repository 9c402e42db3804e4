//! Sentence commands: say, parse and the interactive shell

use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use verba_core::{
    config::Config,
    db::Database,
    dispatch::{Dispatcher, Response},
    interpreter::{Interpreter, ParsedCommand},
    models::{Category, Transaction},
    Store,
};

use super::{render_report, truncate};

const EXIT_WORDS: &[&str] = &["sair", "exit", "quit"];

fn interpreter_for(db: &Database, config: &Config) -> Result<Interpreter> {
    Ok(Interpreter::new(config.interpreter.clone()).with_categories(db.list_categories(None)?))
}

fn run_sentence(
    db: &Database,
    config: &Config,
    text: &str,
    now: DateTime<Utc>,
) -> Result<(ParsedCommand, Response)> {
    let command = interpreter_for(db, config)?.interpret(text, now)?;
    let response = Dispatcher::new(db, config).execute(&command, now)?;
    Ok((command, response))
}

pub fn cmd_say(
    db: &Database,
    config: &Config,
    text: &str,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let (command, response) = run_sentence(db, config, text, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        if command.ambiguous {
            println!(
                "   ⚠️  Frase ambígua, entendido como: {}",
                command.intent.label()
            );
        }
        render_response(&response);
    }
    Ok(())
}

pub fn cmd_parse(db: &Database, config: &Config, text: &str, now: DateTime<Utc>) -> Result<()> {
    let command = interpreter_for(db, config)?.interpret(text, now)?;
    println!("{}", serde_json::to_string_pretty(&command)?);
    Ok(())
}

pub fn cmd_shell(db: &Database, config: &Config) -> Result<()> {
    println!("💬 Verba - digite um comando (\"ajuda\" para exemplos, \"sair\" para encerrar)");
    let stdin = io::stdin();
    run_shell(db, config, stdin.lock())
}

/// Read sentences line by line until EOF or an exit word
///
/// Failures are reported and the loop continues.
pub fn run_shell<R: BufRead>(db: &Database, config: &Config, input: R) -> Result<()> {
    let mut lines = input.lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if EXIT_WORDS.iter().any(|w| text.eq_ignore_ascii_case(w)) {
            break;
        }

        match run_sentence(db, config, text, Utc::now()) {
            Ok((_, response)) => render_response(&response),
            Err(e) => println!("   ❌ {}", e),
        }
    }
    println!("👋 Até logo!");
    Ok(())
}

fn print_transaction(tx: &Transaction) {
    println!(
        "   {} │ {:>10.2} │ {:20} │ {}",
        tx.date,
        tx.signed_amount(),
        truncate(&tx.category, 20),
        truncate(tx.description.as_deref().unwrap_or(""), 30)
    );
}

fn print_category(category: &Category) {
    println!("   {:8} │ {}", category.kind.label(), category.name);
}

/// Human-readable rendering of a command outcome
pub fn render_response(response: &Response) {
    match response {
        Response::Created(tx) => {
            println!("✅ Transação registrada ({}):", tx.kind.label());
            print_transaction(tx);
            println!("   id: {}", tx.id);
        }
        Response::Updated(tx) => {
            println!("✏️  Transação atualizada:");
            print_transaction(tx);
        }
        Response::Deleted(tx) => {
            println!("🗑️  Transação excluída:");
            print_transaction(tx);
        }
        Response::Listed(transactions) => {
            if transactions.is_empty() {
                println!("   Nenhuma transação encontrada.");
                return;
            }
            println!();
            println!("📝 Transações ({})", transactions.len());
            println!("   ─────────────────────────────────────────────────────────────");
            for tx in transactions {
                print_transaction(tx);
            }
            let net: rust_decimal::Decimal = transactions.iter().map(|t| t.signed_amount()).sum();
            println!("   ─────────────────────────────────────────────────────────────");
            println!("   Saldo do período: {:.2}", net);
        }
        Response::CategoryCreated(category) => {
            println!("✅ Categoria criada:");
            print_category(category);
        }
        Response::Categories(categories) => {
            println!();
            println!("🏷️  Categorias");
            println!("   ─────────────────────────────────────────────────────────────");
            for category in categories {
                print_category(category);
            }
        }
        Response::Report(report) => render_report(report),
        Response::Help(examples) => {
            println!();
            println!("💡 Exemplos de comandos");
            println!("   ─────────────────────────────────────────────────────────────");
            for (what, example) in examples.iter() {
                println!("   {:28} │ {}", what, example);
            }
        }
    }
}
