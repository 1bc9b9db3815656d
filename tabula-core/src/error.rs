//! Error types for Tabula operations
//!
//! Nothing here is fatal to the process. The worst outcome of any error is a
//! field that stays uncommitted.

use crate::ColumnType;
use thiserror::Error;

/// Kind of check a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    MinLength,
    MaxLength,
    Pattern,
    MinValue,
    MaxValue,
    Integer,
    Email,
    Url,
    Option,
    Rating,
    DateOrder,
    Coordinates,
    Amount,
    Quantity,
    Member,
}

/// A failed rule on one field. Shown inline, never blocks other fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{message}")]
    Required { field: String, message: String },

    #[error("{message}")]
    Constraint {
        field: String,
        constraint: ConstraintKind,
        message: String,
    },

    #[error("{message}")]
    Shape {
        field: String,
        expected: &'static str,
        message: String,
    },
}

impl ValidationError {
    /// Schema key of the failing field (`name`, `status`, `cell_<id>`).
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field, .. }
            | ValidationError::Constraint { field, .. }
            | ValidationError::Shape { field, .. } => field,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationError::Required { message, .. }
            | ValidationError::Constraint { message, .. }
            | ValidationError::Shape { message, .. } => message,
        }
    }
}

/// Malformed composite payload. Recovered inside the codec by degrading to a
/// plain representation; only ever logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed JSON for {column_type} column {column}: {reason}")]
    MalformedJson {
        column: String,
        column_type: ColumnType,
        reason: String,
    },

    #[error("Unexpected {found} for {column_type} column {column}")]
    UnexpectedShape {
        column: String,
        column_type: ColumnType,
        found: &'static str,
    },
}

/// A configured constraint that could not be compiled. The constraint is
/// dropped; the rest of the schema still builds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstraintCompileError {
    #[error("Invalid pattern {pattern:?} on column {column}: {reason}")]
    InvalidPattern {
        column: String,
        pattern: String,
        reason: String,
    },

    #[error("Inverted bounds on column {column}: {constraint:?} min exceeds max")]
    InvertedBounds {
        column: String,
        constraint: ConstraintKind,
    },
}

/// Edit-session errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Value for column {column} failed validation: {}", summarize(.errors))]
    ValidationFailed {
        column: String,
        errors: Vec<ValidationError>,
    },

    #[error("Column {column} is calculated automatically and cannot be edited")]
    ManualEditLocked { column: String },

    #[error("Column {column} is hidden and cannot be edited")]
    ColumnHidden { column: String },

    #[error("Column type {column_type} has no modal editor")]
    ModalUnsupported { column_type: ColumnType },

    #[error("A modal editor is already open")]
    ModalAlreadyOpen,

    #[error("No modal editor is open")]
    NoModalOpen,

    #[error(transparent)]
    CommitRejected(#[from] CommitRejected),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The persistence collaborator refused a commit.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Commit of column {column} rejected: {reason}")]
pub struct CommitRejected {
    pub column: String,
    pub reason: String,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Master error type for all Tabula errors.
#[derive(Debug, Error)]
pub enum TabulaError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Constraint error: {0}")]
    Constraint(#[from] ConstraintCompileError),

    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Tabula operations.
pub type TabulaResult<T> = Result<T, TabulaError>;

// =============================================================================
// TESTS
// =============================================================================
