//! Lexical normalization of Portuguese commands
//!
//! The sentence is folded (lowercase, no diacritics) for matching, then
//! scanned for literals in a fixed order: quoted text, transaction ids, date
//! ranges, relative periods, month names, dates, and finally amounts. Each
//! recognized literal becomes a single placeholder token (`#valor`, `#data`,
//! ...) so intent rules can require it. Every token keeps the byte range of
//! the original sentence it came from, which lets category names and
//! descriptions be reported with their original casing and accents.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::text::fold_char;

const MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "marco", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

const MONTH_ALT: &str =
    "janeiro|fevereiro|marco|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro";

/// A single date expression: numeric date, relative day, or month name
const DATE_EXPR: &str = r"\d{1,2}/\d{1,2}(?:/(?:\d{4}|\d{2}))?|anteontem|ontem|hoje|(?:janeiro|fevereiro|marco|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)(?:\s+(?:de\s+)?\d{4})?";

/// Common typos, folded
const MISSPELLINGS: &[(&str, &str)] = &[
    ("adcionar", "adicionar"),
    ("adicinar", "adicionar"),
    ("adiconar", "adicionar"),
    ("dispesa", "despesa"),
    ("despeza", "despesa"),
    ("despesaa", "despesa"),
    ("dispesas", "despesas"),
    ("receta", "receita"),
    ("recieta", "receita"),
    ("dinhero", "dinheiro"),
    ("ballanco", "balanco"),
    ("balaco", "balanco"),
    ("balanso", "balanco"),
    ("trasacao", "transacao"),
    ("tranzacao", "transacao"),
    ("transacoa", "transacao"),
    ("trasacoes", "transacoes"),
    ("categria", "categoria"),
    ("catgoria", "categoria"),
    ("categorais", "categorias"),
    ("exluir", "excluir"),
    ("excuir", "excluir"),
    ("registar", "registrar"),
    ("relatoria", "relatorio"),
    ("previssao", "previsao"),
];

/// A value recognized in the sentence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Literal {
    /// Money amount; negative when written with a leading minus
    Amount(Decimal),
    Date(NaiveDate),
    /// Inclusive range, not yet checked for start <= end
    Range { start: NaiveDate, end: NaiveDate },
    /// "até <data>" without a start date
    Until(NaiveDate),
    /// "últimos N meses"
    Months(u32),
    Identifier(String),
    /// Quoted text, verbatim from the original sentence
    Quoted(String),
}

impl Literal {
    /// Placeholder token the intent rules see
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Amount(_) => "#valor",
            Self::Date(_) => "#data",
            Self::Range { .. } | Self::Until(_) | Self::Months(_) => "#periodo",
            Self::Identifier(_) => "#id",
            Self::Quoted(_) => "#texto",
        }
    }
}

/// A word or literal, with its byte range in the original sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Folded, spell-corrected word, or a literal placeholder
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Index into [`NormalizedText::literals`]
    pub literal: Option<usize>,
}

impl Token {
    pub fn is_literal(&self) -> bool {
        self.literal.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedText {
    original: String,
    folded: String,
    pub tokens: Vec<Token>,
    pub literals: Vec<Literal>,
}

impl NormalizedText {
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Original text covered by tokens `first..=last`
    pub fn original_span(&self, first: usize, last: usize) -> &str {
        let start = self.tokens[first].start;
        let end = self.tokens[last].end;
        &self.original[start..end]
    }

    pub fn literal_of(&self, token: &Token) -> Option<&Literal> {
        token.literal.and_then(|i| self.literals.get(i))
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t.text == word)
    }

    pub fn has_any(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.has_word(w))
    }
}

struct Patterns {
    quoted: Regex,
    identifier: Regex,
    bare_identifier: Regex,
    range: Regex,
    since: Regex,
    until: Regex,
    last_months: Regex,
    relative_period: Regex,
    month: Regex,
    date: Regex,
    relative_day: Regex,
    amount: Regex,
    word: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        quoted: Regex::new(r#""([^"]+)"|“([^”]+)”|'([^']+)'"#).expect("valid regex"),
        identifier: Regex::new(r"\bid\b\s*[:#=]?\s*([a-z0-9][a-z0-9-]*)").expect("valid regex"),
        bare_identifier: Regex::new(r"\b[0-9a-f]{32}\b").expect("valid regex"),
        range: Regex::new(&format!(
            r"\b(?:(?:de|entre|desde|do|da)\s+)?(?:dia\s+)?({d})\s+(?:a|ate|ao|e)\s+(?:dia\s+|o\s+dia\s+)?({d})\b",
            d = DATE_EXPR
        ))
        .expect("valid regex"),
        since: Regex::new(&format!(r"\b(?:desde|a\s+partir\s+de)\s+(?:dia\s+)?({})\b", DATE_EXPR))
            .expect("valid regex"),
        until: Regex::new(&format!(r"\bate\s+(?:dia\s+|o\s+dia\s+)?({})\b", DATE_EXPR))
            .expect("valid regex"),
        last_months: Regex::new(r"\b(?:(?:nos|dos|os)\s+)?ultimos\s+(\d{1,2})\s+meses\b")
            .expect("valid regex"),
        relative_period: Regex::new(
            r"\b(?:(?P<this_month>(?:este|esse|neste|nesse|deste|desse)\s+mes|mes\s+(?:atual|corrente))|(?P<last_month>mes\s+passado|ultimo\s+mes|mes\s+anterior)|(?P<this_week>(?:esta|essa|nesta|nessa|desta|dessa)\s+semana)|(?P<last_week>semana\s+passada|ultima\s+semana|semana\s+anterior))\b",
        )
        .expect("valid regex"),
        month: Regex::new(&format!(r"\b({})(?:\s+(?:de\s+)?(\d{{4}}))?\b", MONTH_ALT))
            .expect("valid regex"),
        date: Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").expect("valid regex"),
        relative_day: Regex::new(r"\b(anteontem|ontem|hoje)\b").expect("valid regex"),
        amount: Regex::new(r"(?:r\$\s*)?(-\s*)?\b(\d[\d.,]*\d|\d)\b(\s+mil\b)?")
            .expect("valid regex"),
        word: Regex::new(r"\w+").expect("valid regex"),
    })
}

/// Parse a Brazilian-formatted amount
///
/// Disambiguation rule:
/// - a comma followed by exactly two final digits is the decimal separator,
///   and any dots before it are thousands separators (`1.500,00` = 1500.00);
/// - any other comma is a thousands separator (`1,234` = 1234, `1,5` = 15);
/// - with no decimal comma, a single dot followed by one or two final digits
///   is a decimal point (`10.5` = 10.50), otherwise dots are thousands
///   separators (`1.500` = 1500).
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    parse_amount_with(raw, 2..=2)
}

/// `decimal_digits` is how many digits after a comma make it a decimal comma
fn parse_amount_with(raw: &str, decimal_digits: std::ops::RangeInclusive<usize>) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let decimal_comma = raw.rfind(',').filter(|&pos| {
        let frac = &raw[pos + 1..];
        decimal_digits.contains(&frac.len())
            && frac.chars().all(|c| c.is_ascii_digit())
            && !raw[..pos].contains(',')
    });

    let normalized = match decimal_comma {
        Some(pos) => format!("{}.{}", raw[..pos].replace('.', ""), &raw[pos + 1..]),
        None => {
            let no_commas = raw.replace(',', "");
            let dots = no_commas.matches('.').count();
            match no_commas.rfind('.') {
                Some(pos) if dots == 1 && (1..=2).contains(&(no_commas.len() - pos - 1)) => {
                    no_commas
                }
                _ => no_commas.replace('.', ""),
            }
        }
    };

    if normalized.is_empty() || normalized.starts_with('.') {
        return None;
    }
    Decimal::from_str(&normalized).ok().map(|d| d.round_dp(2))
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// First and last day of the month containing `date`
pub fn month_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    month_bounds(date.year(), date.month()).unwrap_or((date, date))
}

/// First and last day of the month before the one containing `date`
pub fn previous_month_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (first, _) = month_of(date);
    match first.pred_opt() {
        Some(last_of_prev) => month_of(last_of_prev),
        None => (first, first),
    }
}

fn week_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

fn expand_year(year: &str) -> Option<i32> {
    let value: i32 = year.parse().ok()?;
    Some(if year.len() == 2 { 2000 + value } else { value })
}

fn numeric_date(caps: &Captures, today: NaiveDate) -> Option<NaiveDate> {
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year = match caps.get(3) {
        Some(y) => expand_year(y.as_str())?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn relative_day(word: &str, today: NaiveDate) -> Option<NaiveDate> {
    match word {
        "hoje" => Some(today),
        "ontem" => today.pred_opt(),
        "anteontem" => today.pred_opt()?.pred_opt(),
        _ => None,
    }
}

fn month_range(caps: &Captures, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let name = caps.get(1)?.as_str();
    let month = MONTHS.iter().position(|m| *m == name)? as u32 + 1;
    let year = match caps.get(2) {
        Some(y) => y.as_str().parse().ok()?,
        None => today.year(),
    };
    month_bounds(year, month)
}

/// The span of days a single date expression covers
fn date_expr_span(expr: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let p = patterns();
    if let Some(caps) = p.date.captures(expr) {
        let date = numeric_date(&caps, today)?;
        return Some((date, date));
    }
    if let Some(date) = relative_day(expr, today) {
        return Some((date, date));
    }
    p.month
        .captures(expr)
        .and_then(|caps| month_range(&caps, today))
}

struct Scanner<'a> {
    folded: &'a str,
    claimed: Vec<(usize, usize, Option<Literal>)>,
}

impl<'a> Scanner<'a> {
    fn is_free(&self, start: usize, end: usize) -> bool {
        self.claimed.iter().all(|(s, e, _)| end <= *s || start >= *e)
    }

    /// Claim every free match of `re`, turning it into a literal with `make`
    ///
    /// A claimed span with no literal is swallowed: it produces no token.
    fn scan<F>(&mut self, re: &Regex, mut make: F)
    where
        F: FnMut(&Captures) -> Option<Literal>,
    {
        let found: Vec<(usize, usize, Option<Literal>)> = re
            .captures_iter(self.folded)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                Some((m.start(), m.end(), make(&caps)))
            })
            .collect();
        for (start, end, literal) in found {
            if self.is_free(start, end) {
                self.claimed.push((start, end, literal));
            }
        }
    }
}

/// Normalize a sentence relative to `today`
pub fn normalize(text: &str, today: NaiveDate) -> NormalizedText {
    // Fold char by char, remembering where each folded byte came from
    let mut folded = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len() + 1);
    for (offset, c) in text.char_indices() {
        let f = fold_char(c);
        for _ in 0..f.len_utf8() {
            origin.push(offset);
        }
        folded.push(f);
    }
    origin.push(text.len());

    let p = patterns();
    let mut scanner = Scanner {
        folded: &folded,
        claimed: Vec::new(),
    };

    scanner.scan(&p.quoted, |caps| {
        let inner = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
        let original = &text[origin[inner.start()]..origin[inner.end()]];
        let trimmed = original.trim();
        (!trimmed.is_empty()).then(|| Literal::Quoted(trimmed.to_string()))
    });
    scanner.scan(&p.identifier, |caps| {
        Some(Literal::Identifier(caps.get(1)?.as_str().to_string()))
    });
    scanner.scan(&p.bare_identifier, |caps| {
        Some(Literal::Identifier(caps.get(0)?.as_str().to_string()))
    });
    scanner.scan(&p.range, |caps| {
        let (start, _) = date_expr_span(caps.get(1)?.as_str(), today)?;
        let (_, end) = date_expr_span(caps.get(2)?.as_str(), today)?;
        Some(Literal::Range { start, end })
    });
    scanner.scan(&p.since, |caps| {
        let (start, _) = date_expr_span(caps.get(1)?.as_str(), today)?;
        Some(Literal::Range { start, end: today })
    });
    scanner.scan(&p.until, |caps| {
        let (_, end) = date_expr_span(caps.get(1)?.as_str(), today)?;
        Some(Literal::Until(end))
    });
    scanner.scan(&p.last_months, |caps| {
        let n: u32 = caps.get(1)?.as_str().parse().ok()?;
        (n > 0).then_some(Literal::Months(n))
    });
    scanner.scan(&p.relative_period, |caps| {
        let (start, end) = if caps.name("this_month").is_some() {
            month_of(today)
        } else if caps.name("last_month").is_some() {
            previous_month_of(today)
        } else if caps.name("this_week").is_some() {
            week_of(today)
        } else {
            week_of(today - Duration::days(7))
        };
        Some(Literal::Range { start, end })
    });
    scanner.scan(&p.month, |caps| {
        let (start, end) = month_range(caps, today)?;
        Some(Literal::Range { start, end })
    });
    // Impossible dates (31/02) are claimed without a literal so their digits
    // are not read as amounts
    scanner.scan(&p.date, |caps| numeric_date(caps, today).map(Literal::Date));
    scanner.scan(&p.relative_day, |caps| {
        relative_day(caps.get(1)?.as_str(), today).map(Literal::Date)
    });
    scanner.scan(&p.amount, |caps| {
        let digits = caps.get(2)?.as_str();
        let value = if caps.get(3).is_some() {
            // "1,5 mil": a comma before a thousands word is always decimal
            parse_amount_with(digits, 1..=2)?.checked_mul(Decimal::from(1000))?
        } else {
            parse_amount(digits)?
        };
        Some(Literal::Amount(if caps.get(1).is_some() {
            -value
        } else {
            value
        }))
    });

    let mut claimed = scanner.claimed;
    claimed.sort_by_key(|(start, _, _)| *start);

    let mut tokens = Vec::new();
    let mut literals = Vec::new();
    let push_words = |from: usize, to: usize, tokens: &mut Vec<Token>| {
        for m in p.word.find_iter(&folded[from..to]) {
            let word = m.as_str();
            let text = MISSPELLINGS
                .iter()
                .find(|(wrong, _)| *wrong == word)
                .map(|(_, right)| right.to_string())
                .unwrap_or_else(|| word.to_string());
            tokens.push(Token {
                text,
                start: origin[from + m.start()],
                end: origin[from + m.end()],
                literal: None,
            });
        }
    };

    let mut pos = 0;
    for (start, end, literal) in claimed {
        push_words(pos, start, &mut tokens);
        if let Some(literal) = literal {
            tokens.push(Token {
                text: literal.placeholder().to_string(),
                start: origin[start],
                end: origin[end],
                literal: Some(literals.len()),
            });
            literals.push(literal);
        }
        pos = end;
    }
    push_words(pos, folded.len(), &mut tokens);

    NormalizedText {
        original: text.to_string(),
        folded,
        tokens,
        literals,
    }
}
