//! Ordered intent rules
//!
//! Each rule is a data record: every `required` group must have at least one
//! of its words among the sentence tokens, and none of the `excluded` words
//! may be present. Rules are tried top to bottom and the first match wins, so
//! specific intents sit above generic ones. Literal placeholders (`#valor`,
//! `#data`, `#periodo`, `#id`, `#texto`) can be required or excluded like
//! any other word.

use std::collections::HashSet;

use super::normalize::NormalizedText;
use super::Intent;

pub struct IntentRule {
    pub intent: Intent,
    pub required: &'static [&'static [&'static str]],
    pub excluded: &'static [&'static str],
}

impl IntentRule {
    pub fn matches(&self, words: &HashSet<&str>) -> bool {
        self.required
            .iter()
            .all(|group| group.iter().any(|w| words.contains(w)))
            && !self.excluded.iter().any(|w| words.contains(w))
    }
}

const ADD_VERBS: &[&str] = &[
    "adicionar", "registrar", "inserir", "incluir", "cadastrar", "lancar", "anotar", "criar",
    "nova", "novo",
];

const EXPENSE_TRIGGERS: &[&str] = &[
    "adicionar", "registrar", "inserir", "incluir", "cadastrar", "lancar", "anotar", "nova",
    "novo", "gastei", "paguei", "comprei",
];

const EXPENSE_WORDS: &[&str] = &[
    "despesa", "despesas", "gasto", "gastos", "gastei", "paguei", "comprei", "compra", "conta",
    "custo",
];

const INCOME_TRIGGERS: &[&str] = &[
    "adicionar", "registrar", "inserir", "incluir", "cadastrar", "lancar", "anotar", "nova",
    "novo", "recebi", "ganhei", "entrou",
];

const INCOME_WORDS: &[&str] = &[
    "receita", "receitas", "renda", "ganho", "ganhos", "recebi", "ganhei", "entrou", "salario",
];

const LIST_VERBS: &[&str] = &[
    "listar", "lista", "mostrar", "mostre", "exibir", "ver", "consultar", "quais", "buscar",
    "procurar", "filtrar",
];

const TRANSACTION_WORDS: &[&str] = &[
    "transacao", "transacoes", "despesa", "despesas", "gastos", "receita", "receitas",
    "movimentacoes", "lancamentos", "entradas", "saidas", "compras",
];

pub const RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Help,
        required: &[&["ajuda", "help", "comandos", "ajudar"]],
        excluded: &["#valor", "#id"],
    },
    IntentRule {
        intent: Intent::AddCategory,
        required: &[ADD_VERBS, &["categoria"]],
        excluded: &["#valor", "#id"],
    },
    IntentRule {
        intent: Intent::ListCategories,
        required: &[&["categorias"]],
        excluded: &["#valor", "#id"],
    },
    IntentRule {
        intent: Intent::Delete,
        required: &[&[
            "excluir", "apagar", "deletar", "remover", "eliminar", "cancelar", "desfazer",
        ]],
        excluded: &[],
    },
    IntentRule {
        intent: Intent::Update,
        required: &[&[
            "atualizar", "editar", "alterar", "modificar", "mudar", "corrigir", "ajustar",
            "trocar",
        ]],
        excluded: &[],
    },
    IntentRule {
        intent: Intent::Recurring,
        required: &[&[
            "recorrente", "recorrentes", "recorrencia", "recorrencias", "fixas", "fixos",
            "assinaturas",
        ]],
        excluded: &["#valor", "adicionar", "registrar"],
    },
    IntentRule {
        intent: Intent::Forecast,
        required: &[&[
            "previsao", "previsoes", "prever", "projecao", "projetar", "estimativa",
        ]],
        excluded: &["#valor"],
    },
    IntentRule {
        intent: Intent::Forecast,
        required: &[&["quanto"], &["vou"], &["gastar"]],
        excluded: &[],
    },
    IntentRule {
        intent: Intent::Trends,
        required: &[&["tendencia", "tendencias", "evolucao"]],
        excluded: &["#valor"],
    },
    IntentRule {
        intent: Intent::HealthScore,
        required: &[
            &["saude", "score", "nota", "pontuacao", "indice"],
            &["financeira", "financeiro", "financas"],
        ],
        excluded: &["#valor"],
    },
    IntentRule {
        intent: Intent::HealthScore,
        required: &[&["como"], &["estao", "vao", "andam"], &["financas"]],
        excluded: &["#valor"],
    },
    IntentRule {
        intent: Intent::Budget,
        required: &[&["orcamento", "orcamentos"]],
        excluded: &["#valor"],
    },
    IntentRule {
        intent: Intent::Budget,
        required: &[
            &["sugestao", "sugestoes", "sugerir", "sugira", "sugere"],
            &["limite", "limites", "teto", "tetos"],
        ],
        excluded: &["#valor"],
    },
    IntentRule {
        intent: Intent::AddExpense,
        required: &[EXPENSE_TRIGGERS, EXPENSE_WORDS],
        excluded: &["receita", "receitas", "recebi", "ganhei", "quanto"],
    },
    IntentRule {
        intent: Intent::AddIncome,
        required: &[INCOME_TRIGGERS, INCOME_WORDS],
        excluded: &["despesa", "despesas", "quanto"],
    },
    IntentRule {
        intent: Intent::Report,
        required: &[
            &["balanco", "relatorio", "resumo", "extrato", "fechamento"],
            &["#periodo", "#data", "mensal"],
        ],
        excluded: &[],
    },
    IntentRule {
        intent: Intent::Report,
        required: &[&["relatorio", "fechamento"]],
        excluded: &[],
    },
    IntentRule {
        intent: Intent::Balance,
        required: &[&["saldo", "balanco", "resumo", "extrato", "situacao"]],
        excluded: &[],
    },
    IntentRule {
        intent: Intent::Balance,
        required: &[&["quanto"], &["tenho", "sobrou", "resta", "sobra", "possuo"]],
        excluded: &[],
    },
    IntentRule {
        intent: Intent::List,
        required: &[LIST_VERBS, TRANSACTION_WORDS],
        excluded: &[],
    },
    IntentRule {
        intent: Intent::List,
        required: &[&["quanto"], &["gastei", "recebi", "ganhei", "paguei"]],
        excluded: &[],
    },
];

/// Outcome of classification
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    /// Every distinct intent whose rule matched, winner first
    pub candidates: Vec<Intent>,
}

impl Classification {
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

/// Match the sentence against the rule table
pub fn classify(text: &NormalizedText) -> Option<Classification> {
    classify_with(RULES, text)
}

pub fn classify_with(rules: &[IntentRule], text: &NormalizedText) -> Option<Classification> {
    let words: HashSet<&str> = text.tokens.iter().map(|t| t.text.as_str()).collect();

    let mut candidates: Vec<Intent> = Vec::new();
    for rule in rules.iter().filter(|r| r.matches(&words)) {
        if !candidates.contains(&rule.intent) {
            candidates.push(rule.intent);
        }
    }

    let intent = *candidates.first()?;
    Some(Classification { intent, candidates })
}

/// Whether a word is a trigger word of any rule
pub fn is_keyword(word: &str) -> bool {
    RULES.iter().any(|rule| {
        rule.required
            .iter()
            .any(|group| group.iter().any(|w| *w == word))
    })
}
