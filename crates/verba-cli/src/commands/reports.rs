//! Report command implementations

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use verba_core::{
    analytics::{
        AnalyticsEngine, AnalyticsReport, Balance, BudgetPlan, FlowTrend, ForecastSet, HealthScore,
        MonthlyReport, RecurringExpense, TrendsReport,
    },
    config::Config,
    db::Database,
};

use super::truncate;

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

/// Parse a `YYYY-MM` month argument
pub fn parse_month(month: &str) -> Result<(i32, u32)> {
    let (year, month_num) = month
        .split_once('-')
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", month))?;
    let year = year
        .parse()
        .with_context(|| format!("Invalid year in '{}'", month))?;
    let month_num = month_num
        .parse()
        .with_context(|| format!("Invalid month in '{}'", month))?;
    Ok((year, month_num))
}

pub fn report_balance(db: &Database, config: &Config) -> Result<AnalyticsReport> {
    let engine = AnalyticsEngine::new(db, config);
    Ok(AnalyticsReport::Balance(engine.balance(None)?))
}

pub fn report_monthly(
    db: &Database,
    config: &Config,
    month: Option<&str>,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let (year, month) = match month {
        Some(m) => parse_month(m)?,
        None => (now.year(), now.month()),
    };
    let engine = AnalyticsEngine::new(db, config);
    Ok(AnalyticsReport::MonthlyReport(
        engine.monthly_report(year, month)?,
    ))
}

pub fn report_trends(
    db: &Database,
    config: &Config,
    category: Option<&str>,
    months: Option<u32>,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let engine = AnalyticsEngine::new(db, config);
    Ok(AnalyticsReport::Trends(engine.trends(category, months, now)?))
}

pub fn report_forecast(
    db: &Database,
    config: &Config,
    category: Option<&str>,
    months: Option<u32>,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let engine = AnalyticsEngine::new(db, config);
    let set = match category {
        Some(category) => ForecastSet {
            forecasts: vec![engine.forecast(category, months, now)?],
            insufficient: Vec::new(),
        },
        None => engine.forecast_all(months, now)?,
    };
    Ok(AnalyticsReport::Forecast(set))
}

pub fn report_recurring(
    db: &Database,
    config: &Config,
    months: Option<u32>,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let engine = AnalyticsEngine::new(db, config);
    Ok(AnalyticsReport::Recurring(engine.recurring(months, now)?))
}

pub fn report_health(
    db: &Database,
    config: &Config,
    months: Option<u32>,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let engine = AnalyticsEngine::new(db, config);
    Ok(AnalyticsReport::HealthScore(engine.health_score(months, now)?))
}

pub fn report_budget(
    db: &Database,
    config: &Config,
    months: Option<u32>,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let engine = AnalyticsEngine::new(db, config);
    Ok(AnalyticsReport::Budget(engine.budget_plan(months, now)?))
}

pub fn print_report(report: &AnalyticsReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        render_report(report);
    }
    Ok(())
}

/// Human-readable rendering of any analytics report
pub fn render_report(report: &AnalyticsReport) {
    match report {
        AnalyticsReport::Balance(balance) => render_balance(balance),
        AnalyticsReport::MonthlyReport(report) => render_monthly(report),
        AnalyticsReport::Trends(trends) => render_trends(trends),
        AnalyticsReport::Forecast(set) => render_forecast(set),
        AnalyticsReport::Recurring(recurring) => render_recurring(recurring),
        AnalyticsReport::HealthScore(score) => render_health(score),
        AnalyticsReport::Budget(budget) => render_budget(budget),
    }
}

fn render_balance(balance: &Balance) {
    println!();
    match balance.as_of {
        Some(date) => println!("💰 Saldo até {}", date),
        None => println!("💰 Saldo"),
    }
    println!("{}", RULE);
    println!("   Receitas:  {:>12.2}", balance.income);
    println!("   Despesas:  {:>12.2}", balance.expenses);
    println!("   Saldo:     {:>12.2}", balance.balance);
    println!("   ({} transações)", balance.transactions);
}

fn format_change(change: Option<f64>) -> String {
    match change {
        Some(pct) => format!("{:+.1}%", pct),
        None => "-".to_string(),
    }
}

fn render_monthly(report: &MonthlyReport) {
    println!();
    println!("📊 Relatório de {} a {}", report.start, report.end);
    println!("{}", RULE);
    println!(
        "   Receitas:  {:>12.2}   ({} vs. período anterior)",
        report.income,
        format_change(report.previous.income_change)
    );
    println!(
        "   Despesas:  {:>12.2}   ({} vs. período anterior)",
        report.expenses,
        format_change(report.previous.expense_change)
    );
    println!("   Saldo:     {:>12.2}", report.net);
    println!("   Taxa de poupança: {:.1}%", report.savings_rate);
    println!("   {}", report.message);

    if !report.prediction.forecasts.is_empty() {
        let total: rust_decimal::Decimal =
            report.prediction.forecasts.iter().map(|f| f.estimate).sum();
        println!(
            "   Previsão de despesas para {}: {:.2}",
            report.prediction.forecasts[0].target_month.format("%Y-%m"),
            total
        );
    }

    if report.transactions == 0 {
        println!();
        println!("   Nenhuma transação neste período.");
        return;
    }

    if !report.by_category.is_empty() {
        println!();
        println!(
            "   {:24} │ {:8} │ {:>10} │ {:>6}",
            "Categoria", "Tipo", "Total", "%"
        );
        println!("   ─────────────────────────┼──────────┼────────────┼───────");
        for total in &report.by_category {
            println!(
                "   {:24} │ {:8} │ {:>10.2} │ {:>5.1}%",
                truncate(&total.category, 24),
                total.kind.label(),
                total.total,
                total.share
            );
        }
    }

    if !report.top_expenses.is_empty() {
        println!();
        println!("   Maiores despesas:");
        for (i, expense) in report.top_expenses.iter().enumerate() {
            println!(
                "   {:>2}. {} │ {:>10.2} │ {:20} │ {}",
                i + 1,
                expense.date,
                expense.amount,
                truncate(&expense.category, 20),
                truncate(expense.description.as_deref().unwrap_or(""), 30)
            );
        }
    }
}

fn format_flow(flow: &FlowTrend) -> String {
    format!("{} ({:.1}% ao mês)", flow.direction.label(), flow.percentage)
}

fn render_trends(trends: &TrendsReport) {
    let overall = &trends.overall;
    println!();
    println!("📈 Tendências");
    println!("{}", RULE);
    println!("   Receitas:  {}", format_flow(&overall.income));
    println!("   Despesas:  {}", format_flow(&overall.expenses));
    println!("   Poupança:  {}", format_flow(&overall.savings));

    println!();
    println!(
        "   {:8} │ {:>12} │ {:>12} │ {:>12}",
        "Mês", "Receitas", "Despesas", "Saldo"
    );
    println!("   ─────────┼──────────────┼──────────────┼─────────────");
    for month in &overall.months {
        println!(
            "   {:8} │ {:>12.2} │ {:>12.2} │ {:>12.2}",
            month.month.format("%Y-%m"),
            month.income,
            month.expenses,
            month.balance
        );
    }

    println!();
    println!("   Gastos por categoria:");
    if trends.categories.is_empty() {
        println!("   Sem dados suficientes.");
        return;
    }

    println!(
        "   {:24} │ {:10} │ {:>8} │ {:>10} │ {:>10}",
        "Categoria", "Tendência", "Variação", "Média", "Último"
    );
    println!("   ─────────────────────────┼────────────┼──────────┼────────────┼───────────");
    for trend in &trends.categories {
        println!(
            "   {:24} │ {:10} │ {:>+7.1}% │ {:>10.2} │ {:>10.2}",
            truncate(&trend.category, 24),
            trend.direction.label(),
            trend.magnitude * 100.0,
            trend.mean,
            trend.last
        );
    }
}

fn render_forecast(set: &ForecastSet) {
    println!();
    println!("🔮 Previsão de gastos");
    println!("{}", RULE);

    if set.forecasts.is_empty() {
        println!("   Histórico insuficiente para prever.");
    } else {
        println!(
            "   {:24} │ {:8} │ {:>10} │ {:>23}",
            "Categoria", "Mês", "Estimativa", "Intervalo"
        );
        println!("   ─────────────────────────┼──────────┼────────────┼─────────────────────────");
        for forecast in &set.forecasts {
            println!(
                "   {:24} │ {:8} │ {:>10.2} │ {:>10.2} a {:>10.2}",
                truncate(&forecast.category, 24),
                forecast.target_month.format("%Y-%m"),
                forecast.estimate,
                forecast.lower,
                forecast.upper
            );
        }
    }

    if !set.insufficient.is_empty() {
        println!();
        println!("   Histórico insuficiente: {}", set.insufficient.join(", "));
    }
}

fn render_recurring(recurring: &[RecurringExpense]) {
    println!();
    println!("🔁 Despesas recorrentes");
    println!("{}", RULE);

    if recurring.is_empty() {
        println!("   Nenhuma despesa recorrente encontrada.");
        return;
    }

    for item in recurring {
        println!(
            "   {:20} │ {:>10.2} │ {:8} │ {}x │ próxima: {}",
            truncate(&item.category, 20),
            item.amount,
            item.cadence.label(),
            item.occurrences,
            item.next_expected
        );
        if let Some(description) = &item.description {
            println!("   {:20} │ {}", "", truncate(description, 40));
        }
    }

    let monthly: f64 = recurring.iter().map(|r| r.monthly_amount()).sum();
    println!("{}", RULE);
    println!("   Custo mensal estimado: {:.2}", monthly);
}

fn render_health(score: &HealthScore) {
    println!();
    println!("🩺 Saúde financeira: {:.1} / 100 ({})", score.score, score.grade);
    println!("{}", RULE);
    for factor in &score.factors {
        println!(
            "   {:18} │ {:>+6.1} │ {}",
            factor.name, factor.points, factor.detail
        );
    }

    if !score.recommendations.is_empty() {
        println!();
        println!("   Recomendações:");
        for tip in &score.recommendations {
            println!("   • {}", tip);
        }
    }
}

fn render_budget(plan: &BudgetPlan) {
    let summary = &plan.summary;
    println!();
    println!("📋 Orçamento sugerido");
    println!("{}", RULE);
    println!("   Renda mensal média: {:.2}", summary.monthly_income);
    println!();
    println!("   {:16} │ {:>12} │ {:>12}", "", "Atual", "Ideal");
    println!("   ─────────────────┼──────────────┼─────────────");
    println!(
        "   {:16} │ {:>12.2} │ {:>12.2}",
        "Necessidades", summary.essential, summary.ideal_essential
    );
    println!(
        "   {:16} │ {:>12.2} │ {:>12.2}",
        "Desejos", summary.non_essential, summary.ideal_non_essential
    );
    println!(
        "   {:16} │ {:>12.2} │ {:>12.2}",
        "Poupança", summary.savings, summary.ideal_savings
    );
    println!("   {}", summary.message);

    println!();
    if plan.suggestions.is_empty() {
        println!("   Sem histórico de despesas para sugerir um orçamento.");
        return;
    }

    println!(
        "   {:24} │ {:>10} │ {:>10}",
        "Categoria", "Sugerido", "Média"
    );
    println!("   ─────────────────────────┼────────────┼───────────");
    for suggestion in &plan.suggestions {
        println!(
            "   {:24} │ {:>10.2} │ {:>10.2}",
            truncate(&suggestion.category, 24),
            suggestion.amount,
            suggestion.monthly_average
        );
    }
    let total: rust_decimal::Decimal = plan.suggestions.iter().map(|b| b.amount).sum();
    println!("{}", RULE);
    println!("   Total: {:.2}", total);
}
