//! Slot extraction
//!
//! For a classified sentence, pulls the typed values its intent needs. This is
//! read-only over the normalized text: nothing here touches the store, so a
//! failing extraction never leaves partial side effects.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::normalize::{month_of, Literal, NormalizedText};
use super::rules::is_keyword;
use super::Intent;
use crate::config::InterpreterConfig;
use crate::error::{Error, Result};
use crate::models::{amount_in_range, round_money, Category, TransactionKind};
use crate::text::{capitalize, category_key};

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_range(start, end));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Typed values extracted from a sentence
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Slots {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    /// Analytics lookback override ("últimos 3 meses")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_months: Option<u32>,
}

/// Prepositions that introduce a category, highest priority first
const CATEGORY_MARKERS: &[&[&str]] = &[
    &["categoria"],
    &["em"],
    &["como"],
    &["na", "no"],
    &["para"],
    &["de", "do", "da"],
];

/// Expenses read "despesa de 50" as an amount, not a category
const EXPENSE_MARKERS: &[&[&str]] = &[
    &["categoria"],
    &["em"],
    &["como"],
    &["na", "no"],
    &["para"],
];

/// Allowed inside a multi-word category ("plano de saúde") but never at its edges
const CONNECTORS: &[&str] = &["de", "do", "da", "dos", "das"];

/// Words that end a category phrase and never count as description
const STOP_WORDS: &[&str] = &[
    "a", "o", "as", "os", "um", "uma", "ao", "e", "ou", "que", "com", "sem", "pelo", "pela",
    "por", "em", "como", "na", "no", "nas", "nos", "para", "sobre", "referente", "valor",
    "descricao", "data", "dia", "id", "tipo", "reais", "real", "r", "mes", "semana", "ano",
    "meu", "minha", "meus", "minhas", "hoje", "ontem", "anteontem", "categoria", "categorias",
    "transacao", "transacoes", "despesa", "despesas", "receita", "receitas",
];

const MAX_CATEGORY_WORDS: usize = 5;

const EXPENSE_KIND_WORDS: &[&str] = &[
    "despesa", "despesas", "gasto", "gastos", "gastei", "paguei", "saidas", "compras",
];
const INCOME_KIND_WORDS: &[&str] = &[
    "receita", "receitas", "ganho", "ganhos", "recebi", "ganhei", "entradas", "renda",
];

fn is_stop(word: &str) -> bool {
    STOP_WORDS.iter().any(|w| *w == word)
}

fn is_connector(word: &str) -> bool {
    CONNECTORS.iter().any(|w| *w == word)
}

/// Everything slot extraction needs besides the text
pub struct SlotContext<'a> {
    pub config: &'a InterpreterConfig,
    /// Known categories; empty when the caller supplied none
    pub catalog: &'a [Category],
    pub today: NaiveDate,
}

/// A category phrase found in the sentence
struct CategoryMatch {
    name: String,
    /// Token indices the phrase (and its marker) consumed
    tokens: Vec<usize>,
}

impl<'a> SlotContext<'a> {
    /// Canonical name for a phrase: a catalog entry first, then a synonym
    fn resolve(&self, phrase: &str, kind: Option<TransactionKind>) -> Option<String> {
        let key = category_key(phrase);
        if key.is_empty() {
            return None;
        }
        if let Some(found) = self
            .catalog
            .iter()
            .find(|c| kind.map_or(true, |k| c.kind == k) && category_key(&c.name) == key)
        {
            return Some(found.name.clone());
        }
        let kinds = match kind {
            Some(k) => vec![k],
            None => vec![TransactionKind::Expense, TransactionKind::Income],
        };
        kinds
            .into_iter()
            .find_map(|k| self.config.resolve_synonym(phrase, k))
            .map(str::to_string)
    }

    /// Category introduced by a marker word, resolved when possible
    fn marked_category(
        &self,
        text: &NormalizedText,
        kind: Option<TransactionKind>,
        markers: &[&[&str]],
        resolve: bool,
    ) -> Option<CategoryMatch> {
        let tokens = &text.tokens;
        for group in markers {
            for (i, token) in tokens.iter().enumerate() {
                if token.is_literal() || !group.iter().any(|w| *w == token.text) {
                    continue;
                }

                let mut j = i + 1;
                // "categoria para Lazer", "categoria: Lazer"
                if token.text == "categoria" {
                    while j < tokens.len()
                        && (is_connector(&tokens[j].text)
                            || matches!(tokens[j].text.as_str(), "para" | "como"))
                    {
                        j += 1;
                    }
                }

                let mut phrase = Vec::new();
                while j < tokens.len()
                    && phrase.len() < MAX_CATEGORY_WORDS
                    && !tokens[j].is_literal()
                    && !is_stop(&tokens[j].text)
                    && !(phrase.is_empty() && is_connector(&tokens[j].text))
                {
                    phrase.push(j);
                    j += 1;
                }
                while phrase
                    .last()
                    .is_some_and(|&last| is_connector(&tokens[last].text))
                {
                    phrase.pop();
                }
                let (Some(&first), Some(&last)) = (phrase.first(), phrase.last()) else {
                    continue;
                };

                if resolve {
                    // Longest prefix that names a known category
                    for end in (0..phrase.len()).rev() {
                        if is_connector(&tokens[phrase[end]].text) {
                            continue;
                        }
                        let candidate = text.original_span(first, phrase[end]);
                        if let Some(name) = self.resolve(candidate, kind) {
                            let mut used = vec![i];
                            used.extend_from_slice(&phrase[..=end]);
                            return Some(CategoryMatch { name, tokens: used });
                        }
                    }
                }

                let mut used = vec![i];
                used.extend_from_slice(&phrase);
                return Some(CategoryMatch {
                    name: capitalize(text.original_span(first, last)),
                    tokens: used,
                });
            }
        }
        None
    }

    /// A synonym or catalog name appearing anywhere in the sentence
    fn mentioned_category(
        &self,
        text: &NormalizedText,
        kind: Option<TransactionKind>,
    ) -> Option<CategoryMatch> {
        let words: Vec<&str> = text.tokens.iter().map(|t| t.text.as_str()).collect();
        let kinds = match kind {
            Some(k) => vec![k],
            None => vec![TransactionKind::Expense, TransactionKind::Income],
        };

        let mut phrases: Vec<(String, String)> = self
            .catalog
            .iter()
            .filter(|c| kind.map_or(true, |k| c.kind == k))
            .map(|c| (category_key(&c.name), c.name.clone()))
            .collect();
        for k in kinds {
            phrases.extend(
                self.config
                    .synonym_phrases(k)
                    .into_iter()
                    .map(|(phrase, name)| (phrase, name.to_string())),
            );
        }

        for (phrase, name) in phrases {
            let parts: Vec<&str> = phrase.split(' ').collect();
            if parts.is_empty() || parts.len() > words.len() {
                continue;
            }
            for start in 0..=words.len() - parts.len() {
                if words[start..start + parts.len()] == parts[..] {
                    return Some(CategoryMatch {
                        name,
                        tokens: (start..start + parts.len()).collect(),
                    });
                }
            }
        }
        None
    }

    fn category(
        &self,
        text: &NormalizedText,
        kind: Option<TransactionKind>,
    ) -> Option<CategoryMatch> {
        let markers = match kind {
            Some(TransactionKind::Expense) => EXPENSE_MARKERS,
            _ => CATEGORY_MARKERS,
        };
        self.marked_category(text, kind, markers, true)
            .or_else(|| self.mentioned_category(text, kind))
    }
}

fn first_literal<'t, T>(
    text: &'t NormalizedText,
    pick: impl Fn(&'t Literal) -> Option<T>,
) -> Option<T> {
    text.literals.iter().find_map(pick)
}

fn amount(text: &NormalizedText) -> Option<Decimal> {
    first_literal(text, |l| match l {
        Literal::Amount(a) => Some(*a),
        _ => None,
    })
}

fn positive_amount(value: Decimal) -> Result<Decimal> {
    let value = round_money(value);
    if !amount_in_range(value) {
        return Err(Error::InvalidAmount {
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn required_amount(text: &NormalizedText, intent: Intent) -> Result<Decimal> {
    let value = amount(text).ok_or_else(|| Error::MissingAmount {
        intent: intent.label().to_string(),
    })?;
    positive_amount(value)
}

fn single_date(text: &NormalizedText) -> Option<NaiveDate> {
    first_literal(text, |l| match l {
        Literal::Date(d) => Some(*d),
        _ => None,
    })
}

fn quoted(text: &NormalizedText) -> Option<String> {
    first_literal(text, |l| match l {
        Literal::Quoted(q) => Some(q.clone()),
        _ => None,
    })
}

fn identifier(text: &NormalizedText, intent: Intent) -> Result<String> {
    first_literal(text, |l| match l {
        Literal::Identifier(id) => Some(id.clone()),
        _ => None,
    })
    .ok_or_else(|| Error::MissingIdentifier {
        intent: intent.label().to_string(),
    })
}

fn window_months(text: &NormalizedText) -> Option<u32> {
    first_literal(text, |l| match l {
        Literal::Months(n) => Some(*n),
        _ => None,
    })
}

fn kind_mentioned(text: &NormalizedText) -> Option<TransactionKind> {
    let expense = text.has_any(EXPENSE_KIND_WORDS);
    let income = text.has_any(INCOME_KIND_WORDS);
    match (expense, income) {
        (true, false) => Some(TransactionKind::Expense),
        (false, true) => Some(TransactionKind::Income),
        _ => None,
    }
}

/// First period expression in the sentence, validated
///
/// A single date becomes a one-day range; "últimos N meses" runs from the
/// first day of the month N months back through today.
fn period(text: &NormalizedText, today: NaiveDate) -> Result<Option<DateRange>> {
    for literal in &text.literals {
        match literal {
            Literal::Range { start, end } => return DateRange::new(*start, *end).map(Some),
            Literal::Until(end) => {
                return Err(Error::InvalidDateRange {
                    start: "(ausente)".to_string(),
                    end: end.format("%d/%m/%Y").to_string(),
                })
            }
            Literal::Date(d) => return Ok(Some(DateRange { start: *d, end: *d })),
            Literal::Months(n) => {
                let mut first = month_of(today).0;
                for _ in 0..*n {
                    first = month_of(first.pred_opt().unwrap_or(first)).0;
                }
                return DateRange::new(first, today).map(Some);
            }
            _ => {}
        }
    }
    Ok(None)
}

/// Free text left once keywords, literals and the category are removed
fn leftover_description(text: &NormalizedText, consumed: &[usize]) -> Option<String> {
    let remaining: Vec<usize> = text
        .tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| !t.is_literal() && !consumed.contains(i) && !is_keyword(&t.text))
        .map(|(i, _)| i)
        .collect();

    let edge = |i: &usize| {
        let word = text.tokens[*i].text.as_str();
        is_stop(word) || is_connector(word)
    };
    let start = remaining.iter().position(|i| !edge(i))?;
    let end = remaining.iter().rposition(|i| !edge(i))?;

    let words: Vec<&str> = remaining[start..=end]
        .iter()
        .map(|&i| text.original_span(i, i))
        .collect();
    Some(words.join(" "))
}

/// Text following "descrição" up to the next literal
fn described_as(text: &NormalizedText) -> Option<String> {
    let marker = text
        .tokens
        .iter()
        .position(|t| t.text == "descricao" && !t.is_literal())?;
    let rest: Vec<usize> = (marker + 1..text.tokens.len())
        .take_while(|&i| !text.tokens[i].is_literal())
        .collect();
    let start = rest
        .iter()
        .position(|&i| !matches!(text.tokens[i].text.as_str(), "para" | "como" | "de"))?;
    let (&first, &last) = (rest.get(start)?, rest.last()?);
    Some(text.original_span(first, last).to_string())
}

/// Extract the slots `intent` needs
pub fn extract(text: &NormalizedText, intent: Intent, ctx: &SlotContext<'_>) -> Result<Slots> {
    let mut slots = Slots::default();

    match intent {
        Intent::AddExpense | Intent::AddIncome => {
            let kind = if intent == Intent::AddExpense {
                TransactionKind::Expense
            } else {
                TransactionKind::Income
            };
            slots.kind = Some(kind);
            slots.amount = Some(required_amount(text, intent)?);
            slots.date = Some(single_date(text).unwrap_or(ctx.today));

            let found = ctx.category(text, Some(kind));
            let consumed = found.as_ref().map(|m| m.tokens.clone()).unwrap_or_default();
            slots.category = Some(
                found
                    .map(|m| m.name)
                    .unwrap_or_else(|| ctx.config.default_category.clone()),
            );
            slots.description = quoted(text).or_else(|| leftover_description(text, &consumed));
        }
        Intent::Update => {
            slots.transaction_id = Some(identifier(text, intent)?);
            slots.amount = match amount(text) {
                Some(value) => Some(positive_amount(value)?),
                None if text.has_word("valor") => {
                    return Err(Error::MissingAmount {
                        intent: intent.label().to_string(),
                    })
                }
                None => None,
            };
            if let Some(found) = ctx.marked_category(text, None, &[&["categoria"]], true) {
                let known = ctx.catalog.is_empty()
                    || ctx
                        .catalog
                        .iter()
                        .any(|c| category_key(&c.name) == category_key(&found.name));
                if !known {
                    return Err(Error::CategoryNotFound { name: found.name });
                }
                slots.category = Some(found.name);
            }
            slots.date = single_date(text);
            slots.description = quoted(text).or_else(|| described_as(text));
        }
        Intent::Delete => {
            slots.transaction_id = Some(identifier(text, intent)?);
        }
        Intent::List => {
            slots.kind = kind_mentioned(text);
            slots.category = ctx.category(text, slots.kind).map(|m| m.name);
            slots.date_range = period(text, ctx.today)?;
            slots.description = quoted(text);
        }
        Intent::Balance => {
            // "saldo até 10/03" is a balance as of that day
            let until = first_literal(text, |l| match l {
                Literal::Until(d) => Some(*d),
                _ => None,
            });
            slots.date = match until {
                Some(d) => Some(d),
                None => period(text, ctx.today)?.map(|r| r.end),
            };
        }
        Intent::Report => {
            let range = match period(text, ctx.today)? {
                // A single day asks for the month it falls in
                Some(r) if r.start == r.end => {
                    let (start, end) = month_of(r.start);
                    DateRange { start, end }
                }
                Some(r) => r,
                None => {
                    let (start, end) = month_of(ctx.today);
                    DateRange { start, end }
                }
            };
            slots.date_range = Some(range);
        }
        Intent::Trends | Intent::Forecast => {
            slots.category = ctx
                .category(text, Some(TransactionKind::Expense))
                .map(|m| m.name);
            slots.window_months = window_months(text);
        }
        Intent::Recurring | Intent::HealthScore | Intent::Budget => {
            slots.window_months = window_months(text);
        }
        Intent::AddCategory => {
            slots.kind = Some(if text.has_any(INCOME_KIND_WORDS) {
                TransactionKind::Income
            } else {
                TransactionKind::Expense
            });
            slots.category = quoted(text).or_else(|| {
                ctx.marked_category(text, None, &[&["categoria"]], false)
                    .map(|m| m.name)
            });
        }
        Intent::ListCategories => {
            slots.kind = kind_mentioned(text);
        }
        Intent::Help => {}
    }

    Ok(slots)
}
