//! Unified error types for field compilation and join planning.

use thiserror::Error;

use crate::expr::parser::ParseError;

/// Result type for compilation and planning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the crate.
///
/// Covers errors from:
/// - Calculated field validation and compilation
/// - Backend expression lowering
/// - Join path planning
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Field definition with a blank name or expression.
    #[error("Calculated field name and expression must not be blank")]
    BlankFieldDef,

    /// Field name collides with an existing column.
    #[error("Calculated field name already exists: '{0}'")]
    DuplicateColumn(String),

    /// Referenced a column that doesn't exist.
    #[error("Column not found: '{0}'")]
    ColumnNotFound(String),

    /// Expression called a function outside the allow-list.
    ///
    /// This is the security boundary: it is never wrapped or downgraded,
    /// so callers can always tell a rejected function apart from an
    /// ordinary compilation failure.
    #[error("Function not allowed in calculated field expression: '{0}'")]
    FunctionNotAllowed(String),

    /// Function is allowed but has no mapping in the target backend.
    #[error("Function '{name}' is not supported by the {backend} backend")]
    FunctionNotSupported { name: String, backend: &'static str },

    /// Aggregation hint that names no known aggregate function.
    #[error("Unknown aggregation type: '{0}'")]
    InvalidAggregation(String),

    /// Expression syntax error.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Non-security failure while compiling a named field.
    #[error("Failed to compile calculated field '{name}': {source}")]
    FieldCompile {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// Could not find a join path to a requested table.
    #[error("No join path from '{from}' to '{to}'")]
    NoJoinPath { from: String, to: String },

    /// Join edges form a cycle.
    #[error("Cyclic dependency detected in join graph: {0}")]
    CircularJoin(String),
}

impl Error {
    /// Is this the allow-list rejection?
    ///
    /// Security errors must surface unchanged, so the field compiler
    /// checks this before wrapping an error with the field name.
    pub fn is_security(&self) -> bool {
        matches!(self, Error::FunctionNotAllowed(_))
    }
}
