//! Error types for Verba

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    // Parse errors
    #[error("Comando não reconhecido: \"{text}\"")]
    UnrecognizedIntent { text: String },

    #[error("Valor ausente: informe o valor para {intent}")]
    MissingAmount { intent: String },

    #[error("Valor inválido: {value} (o valor deve ser maior que zero e no máximo 1.000.000.000.000,00)")]
    InvalidAmount { value: String },

    #[error("Categoria não encontrada: {name}")]
    CategoryNotFound { name: String },

    #[error("Período inválido: {start} a {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Identificador ausente: informe o id da transação para {intent}")]
    MissingIdentifier { intent: String },

    // Dispatch errors
    #[error("Transação não encontrada: {id}")]
    TransactionNotFound { id: String },

    #[error("Erro de validação: {0}")]
    Validation(String),

    // Analytics errors
    #[error("Histórico insuficiente para {category}: {periods} período(s), mínimo {required}")]
    InsufficientHistory {
        category: String,
        periods: usize,
        required: usize,
    },
}

/// Where an error originated, so a boundary can decide how to present it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Dispatch,
    Analytics,
    Storage,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnrecognizedIntent { .. }
            | Self::MissingAmount { .. }
            | Self::InvalidAmount { .. }
            | Self::CategoryNotFound { .. }
            | Self::InvalidDateRange { .. }
            | Self::MissingIdentifier { .. } => ErrorKind::Parse,
            Self::TransactionNotFound { .. } | Self::Validation(_) => ErrorKind::Dispatch,
            Self::InsufficientHistory { .. } => ErrorKind::Analytics,
            Self::Database(_)
            | Self::Pool(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::InvalidData(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn invalid_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self::InvalidDateRange {
            start: start.format("%d/%m/%Y").to_string(),
            end: end.format("%d/%m/%Y").to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
