//! Parliament error types
//!
//! Every fatal condition a transition can hit is detected before any record
//! is written, so callers can surface these directly and exit.

use std::path::PathBuf;
use thiserror::Error;

use crate::reconcile::Remedy;
use crate::store::RecordKind;

/// Result type alias for parliament operations
pub type ParliamentResult<T> = Result<T, ParliamentError>;

/// Errors that can occur while applying a transition
#[derive(Error, Debug)]
pub enum ParliamentError {
    /// A structured argument could not be parsed
    #[error("Malformed {what}: {message}")]
    MalformedInput { what: String, message: String },

    /// An expected durable record does not exist
    #[error("{kind} record not found at {path}")]
    MissingRecord { kind: RecordKind, path: PathBuf },

    /// A durable record exists but cannot be parsed
    #[error("{kind} record at {path} is corrupt: {message}")]
    CorruptRecord {
        kind: RecordKind,
        path: PathBuf,
        message: String,
    },

    /// Initialization was attempted without any representatives
    #[error("Cannot initialize a parliament with an empty roster")]
    EmptyRoster,

    /// A message payload was not a JSON object
    #[error("Message payload #{index} must be a JSON object, got {found}")]
    InvalidPayload { index: usize, found: String },

    /// A session already exists where initialization would write
    #[error("Parliament already initialized at {path} (pass --force to overwrite)")]
    AlreadyInitialized { path: PathBuf },

    /// Another transition holds the write lock
    #[error("Write lock held at {path}: {holder}")]
    LockHeld { path: PathBuf, holder: String },

    /// Session and ledger disagree and must be reconciled first
    #[error("Session and ledger have diverged: {details}. {remedy}")]
    Diverged { details: String, remedy: Remedy },

    /// The message counter cannot number the requested messages
    #[error("Message ids exhausted: next id is {next}, {requested} requested")]
    IdsExhausted { next: u32, requested: usize },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParliamentError {
    /// Create a malformed input error
    pub fn malformed(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a missing record error
    pub fn missing(kind: RecordKind, path: impl Into<PathBuf>) -> Self {
        Self::MissingRecord {
            kind,
            path: path.into(),
        }
    }

    /// Create a corrupt record error
    pub fn corrupt(kind: RecordKind, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Machine-readable code, stable across message wording changes
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "MALFORMED_INPUT",
            Self::MissingRecord { .. } => "MISSING_RECORD",
            Self::CorruptRecord { .. } => "CORRUPT_RECORD",
            Self::EmptyRoster => "EMPTY_ROSTER",
            Self::InvalidPayload { .. } => "INVALID_PAYLOAD",
            Self::AlreadyInitialized { .. } => "ALREADY_INITIALIZED",
            Self::LockHeld { .. } => "LOCK_HELD",
            Self::Diverged { .. } => "DIVERGED",
            Self::IdsExhausted { .. } => "IDS_EXHAUSTED",
            Self::Config { .. } => "CONFIG",
            Self::Io(_) => "IO",
            Self::Json(_) => "JSON",
        }
    }
}
