//! Column types and aggregation kinds shared by all backends.

use serde::{Deserialize, Serialize};

/// Data type of a physical column or a compiled expression.
///
/// Backends infer a type for every fragment they build; `Unknown` means
/// inference gave up, not that the expression is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    #[default]
    Unknown,
    Text,
    Bool,
    Integer,
    Number,
    Money,
    Datetime,
}

impl ColumnType {
    /// Parse a column type from a string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "UNKNOWN" => Some(ColumnType::Unknown),
            "TEXT" => Some(ColumnType::Text),
            "BOOL" => Some(ColumnType::Bool),
            "INTEGER" => Some(ColumnType::Integer),
            "NUMBER" => Some(ColumnType::Number),
            "MONEY" => Some(ColumnType::Money),
            "DATETIME" => Some(ColumnType::Datetime),
            _ => None,
        }
    }

    /// Is this an exact or approximate numeric type?
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Number | ColumnType::Money
        )
    }

    /// Get the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Unknown => "UNKNOWN",
            ColumnType::Text => "TEXT",
            ColumnType::Bool => "BOOL",
            ColumnType::Integer => "INTEGER",
            ColumnType::Number => "NUMBER",
            ColumnType::Money => "MONEY",
            ColumnType::Datetime => "DATETIME",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate function carried by a fragment or requested by a field
/// definition's `agg` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Max,
    Min,
    GroupConcat,
}

impl Aggregation {
    /// Parse an aggregation from a function name (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SUM" => Some(Aggregation::Sum),
            "AVG" => Some(Aggregation::Avg),
            "COUNT" => Some(Aggregation::Count),
            "MAX" => Some(Aggregation::Max),
            "MIN" => Some(Aggregation::Min),
            "GROUP_CONCAT" => Some(Aggregation::GroupConcat),
            _ => None,
        }
    }

    /// SQL function name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Avg => "AVG",
            Aggregation::Count => "COUNT",
            Aggregation::Max => "MAX",
            Aggregation::Min => "MIN",
            Aggregation::GroupConcat => "GROUP_CONCAT",
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
