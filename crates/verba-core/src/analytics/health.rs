//! Financial health score, budget suggestions and the 50/30/20 summary

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::series::{mean, to_f64, to_money};
use super::types::{
    BudgetBasis, BudgetSuggestion, BudgetSummary, HealthFactor, HealthGrade, HealthScore,
    RecurringExpense,
};
use crate::config::{BudgetConfig, HealthConfig};

/// Figures the health score is computed from
#[derive(Debug, Clone, Default)]
pub struct HealthInputs {
    /// Income per window month, oldest first
    pub monthly_income: Vec<f64>,
    /// Expenses per window month, oldest first
    pub monthly_expenses: Vec<f64>,
    /// Window spend filed under the default category
    pub uncategorized: f64,
    /// Recurring spend normalized to one month
    pub recurring_monthly: f64,
    /// Balance of all transactions up to today
    pub balance: f64,
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Mean of the second half of a series relative to the first half
fn growth(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let (first, second) = series.split_at(series.len() / 2);
    let before = mean(first);
    if before <= 0.0 {
        return 0.0;
    }
    finite((mean(second) - before) / before)
}

fn savings_factor(inputs: &HealthInputs, config: &HealthConfig) -> HealthFactor {
    let income: f64 = inputs.monthly_income.iter().sum();
    let expenses: f64 = inputs.monthly_expenses.iter().sum();
    let (points, detail) = if income > 0.0 {
        let rate = (income - expenses) / income;
        let ratio = finite(rate / config.target_savings_rate).clamp(-1.0, 1.0);
        (
            ratio * config.savings_max,
            format!("taxa de poupança de {:.1}%", finite(rate) * 100.0),
        )
    } else if expenses > 0.0 {
        (-config.savings_max, "despesas sem nenhuma receita".to_string())
    } else {
        (0.0, "sem movimentação no período".to_string())
    };
    HealthFactor {
        name: "poupança",
        points: finite(points),
        detail,
    }
}

fn growth_factor(inputs: &HealthInputs, config: &HealthConfig) -> HealthFactor {
    let gap = growth(&inputs.monthly_expenses) - growth(&inputs.monthly_income);
    let gap_percent = finite(gap * 100.0).max(0.0);
    HealthFactor {
        name: "crescimento de gastos",
        points: -gap_percent.min(config.growth_max),
        detail: if gap_percent > 0.0 {
            format!("gastos crescendo {:.1} p.p. acima da renda", gap_percent)
        } else {
            "gastos acompanham a renda".to_string()
        },
    }
}

fn uncategorized_factor(inputs: &HealthInputs, config: &HealthConfig) -> HealthFactor {
    let expenses: f64 = inputs.monthly_expenses.iter().sum();
    let share = if expenses > 0.0 {
        finite(inputs.uncategorized / expenses).clamp(0.0, 1.0)
    } else {
        0.0
    };
    HealthFactor {
        name: "gastos sem categoria",
        points: -share * config.uncategorized_max,
        detail: format!("{:.1}% dos gastos sem categoria", share * 100.0),
    }
}

fn recurring_factor(inputs: &HealthInputs, config: &HealthConfig) -> HealthFactor {
    let income = mean(&inputs.monthly_income);
    let recurring = finite(inputs.recurring_monthly).max(0.0);
    let ratio = if income > 0.0 {
        finite(recurring / income)
    } else if recurring > 0.0 {
        1.0
    } else {
        0.0
    };
    let excess = if ratio > config.recurring_ratio_limit && config.recurring_ratio_limit < 1.0 {
        ((ratio - config.recurring_ratio_limit) / (1.0 - config.recurring_ratio_limit)).min(1.0)
    } else {
        0.0
    };
    HealthFactor {
        name: "gastos recorrentes",
        points: -finite(excess) * config.recurring_max,
        detail: format!("recorrentes comprometem {:.1}% da renda", ratio * 100.0),
    }
}

fn reserve_factor(inputs: &HealthInputs, config: &HealthConfig) -> HealthFactor {
    let monthly_expense = mean(&inputs.monthly_expenses);
    let balance = finite(inputs.balance);
    let (ratio, detail) = if monthly_expense > 0.0 {
        let months = balance / monthly_expense;
        (
            finite(months / config.target_reserve_months),
            format!("reserva cobre {:.1} mês(es) de gastos", finite(months)),
        )
    } else if balance > 0.0 {
        (1.0, "saldo positivo sem gastos recentes".to_string())
    } else if balance < 0.0 {
        (-1.0, "saldo negativo".to_string())
    } else {
        (0.0, "sem reserva nem gastos".to_string())
    };
    HealthFactor {
        name: "reserva",
        points: ratio.clamp(-1.0, 1.0) * config.reserve_max,
        detail,
    }
}

fn recommendations(factors: &[HealthFactor], score: f64) -> Vec<String> {
    let points = |name: &str| {
        factors
            .iter()
            .find(|f| f.name == name)
            .map_or(0.0, |f| f.points)
    };
    let mut tips = Vec::new();

    if points("poupança") < 0.0 {
        tips.push(
            "Seus gastos estão excedendo sua renda. Reduza despesas não essenciais ou busque aumentar as receitas."
                .to_string(),
        );
    } else if points("poupança") < 10.0 {
        tips.push(
            "Tente a regra 50/30/20: 50% para necessidades, 30% para desejos e 20% para poupança."
                .to_string(),
        );
    }
    if points("crescimento de gastos") < -5.0 {
        tips.push(
            "Seus gastos estão crescendo mais rápido que sua renda. Revise as categorias em alta."
                .to_string(),
        );
    }
    if points("gastos sem categoria") < -2.0 {
        tips.push("Classifique seus gastos em categorias para entender melhor para onde vai o dinheiro.".to_string());
    }
    if points("gastos recorrentes") < 0.0 {
        tips.push(
            "Suas despesas fixas comprometem boa parte da renda. Reavalie assinaturas e contratos."
                .to_string(),
        );
    }
    if points("reserva") < 5.0 {
        tips.push(
            "Monte uma reserva de emergência que cubra pelo menos três meses de gastos.".to_string(),
        );
    }
    if score >= 80.0 {
        tips.push(
            "Sua saúde financeira está excelente! Considere diversificar seus investimentos."
                .to_string(),
        );
    }
    tips
}

/// Compute the 0–100 health score
pub fn health_score(inputs: &HealthInputs, config: &HealthConfig) -> HealthScore {
    let factors = vec![
        savings_factor(inputs, config),
        growth_factor(inputs, config),
        uncategorized_factor(inputs, config),
        recurring_factor(inputs, config),
        reserve_factor(inputs, config),
    ];
    let total: f64 = factors.iter().map(|f| finite(f.points)).sum();
    let score = (finite(config.base + total).clamp(0.0, 100.0) * 10.0).round() / 10.0;

    HealthScore {
        score,
        grade: HealthGrade::from_score(score),
        recommendations: recommendations(&factors, score),
        factors,
    }
}

/// Short advice for a savings rate given as a fraction
pub fn savings_message(rate: f64) -> &'static str {
    if rate < 0.0 {
        "Alerta: seus gastos estão excedendo sua renda."
    } else if rate < 0.1 {
        "Atenção: sua taxa de poupança está abaixo de 10%."
    } else if rate < 0.2 {
        "Bom trabalho: você está poupando entre 10% e 20% da sua renda."
    } else {
        "Excelente: você está poupando mais de 20% da sua renda."
    }
}

fn round_up_to(value: f64, granularity: u32) -> Decimal {
    let step = f64::from(granularity.max(1));
    to_money((finite(value) / step).ceil() * step)
}

/// Suggested monthly cap per expense category
///
/// Categories with a detected recurring expense get that expense normalized
/// to a month and rounded up to `granularity`; the rest get their trailing
/// average with a safety margin.
pub fn budget_suggestions(
    totals: &BTreeMap<String, Vec<Decimal>>,
    recurring: &[RecurringExpense],
    config: &BudgetConfig,
) -> Vec<BudgetSuggestion> {
    let mut suggestions: Vec<BudgetSuggestion> = totals
        .iter()
        .map(|(category, series)| {
            let values: Vec<f64> = series.iter().map(|v| to_f64(*v)).collect();
            let average = mean(&values);
            let recurring_monthly: f64 = recurring
                .iter()
                .filter(|r| r.category == *category)
                .map(RecurringExpense::monthly_amount)
                .sum();

            let (amount, basis) = if recurring_monthly > 0.0 {
                (
                    round_up_to(recurring_monthly, config.granularity),
                    BudgetBasis::Recurring,
                )
            } else {
                (to_money(average * config.safety_margin), BudgetBasis::Average)
            };
            BudgetSuggestion {
                category: category.clone(),
                amount,
                basis,
                monthly_average: to_money(average),
            }
        })
        .collect();

    suggestions.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    suggestions
}

/// Split the average monthly spend into needs and wants and compare it,
/// with what is left over, against the configured shares of income
pub fn budget_summary(
    monthly_income: Decimal,
    suggestions: &[BudgetSuggestion],
    config: &BudgetConfig,
) -> BudgetSummary {
    let (essential, non_essential): (Vec<_>, Vec<_>) = suggestions
        .iter()
        .partition(|s| config.is_essential(&s.category));
    let essential: Decimal = essential.iter().map(|s| s.monthly_average).sum();
    let non_essential: Decimal = non_essential.iter().map(|s| s.monthly_average).sum();
    let savings = monthly_income - essential - non_essential;

    let income = to_f64(monthly_income);
    let savings_rate = if monthly_income.is_zero() {
        0.0
    } else {
        to_f64(savings) / income * 100.0
    };
    let message = if monthly_income.is_zero() && savings.is_zero() {
        "Sem histórico suficiente para avaliar o orçamento."
    } else if monthly_income.is_zero() {
        savings_message(-1.0)
    } else {
        savings_message(savings_rate / 100.0)
    };

    BudgetSummary {
        monthly_income,
        essential,
        non_essential,
        savings,
        savings_rate,
        ideal_essential: to_money(income * config.needs_share),
        ideal_non_essential: to_money(income * config.wants_share),
        ideal_savings: to_money(income * config.savings_share),
        message: message.to_string(),
    }
}
