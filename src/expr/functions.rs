//! Function allow-list for calculated field expressions.
//!
//! Expressions may only call what is listed here; everything else is
//! rejected before any backend sees it. Matching is case-insensitive.
//! Every name added to these sets widens what user expressions can ask
//! the database to execute, so additions need a security review.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Arithmetic operators.
static OPERATORS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["+", "-", "*", "/", "%"].into_iter().collect());

/// Comparison operators.
static COMPARISON: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["==", "===", "!=", "!==", ">", "<", ">=", "<="]
        .into_iter()
        .collect()
});

/// Logical operators, symbol and keyword forms.
static LOGICAL: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["&&", "||", "!", "AND", "OR", "NOT"].into_iter().collect());

/// Math functions.
static MATH: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ABS", "ROUND", "CEIL", "CEILING", "FLOOR", "MOD", "POWER", "POW", "SQRT", "SIGN",
        "TRUNCATE", "TRUNC",
    ]
    .into_iter()
    .collect()
});

/// Date and time functions.
static DATE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "YEAR",
        "MONTH",
        "DAY",
        "HOUR",
        "MINUTE",
        "SECOND",
        "DATE",
        "TIME",
        "NOW",
        "CURRENT_DATE",
        "CURRENT_TIME",
        "CURRENT_TIMESTAMP",
        "DATE_ADD",
        "DATE_SUB",
        "DATEDIFF",
        "TIMESTAMPDIFF",
        "DATE_FORMAT",
        "STR_TO_DATE",
        "EXTRACT",
    ]
    .into_iter()
    .collect()
});

/// String functions.
static STRING: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "CONCAT",
        "CONCAT_WS",
        "SUBSTRING",
        "SUBSTR",
        "LEFT",
        "RIGHT",
        "UPPER",
        "LOWER",
        "TRIM",
        "LTRIM",
        "RTRIM",
        "LENGTH",
        "CHAR_LENGTH",
        "REPLACE",
        "INSTR",
        "LOCATE",
        "LPAD",
        "RPAD",
    ]
    .into_iter()
    .collect()
});

/// Conditional and conversion functions.
static OTHER: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "COALESCE", "NULLIF", "IFNULL", "NVL", "ISNULL", "IF", "CASE", "CAST", "CONVERT",
    ]
    .into_iter()
    .collect()
});

/// Aggregate functions.
static AGGREGATE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["SUM", "AVG", "COUNT", "MAX", "MIN", "GROUP_CONCAT"]
        .into_iter()
        .collect()
});

/// Is this name anywhere in the allow-list?
pub fn is_allowed(name: &str) -> bool {
    let upper = name.to_uppercase();
    let upper = upper.as_str();
    OPERATORS.contains(upper)
        || COMPARISON.contains(upper)
        || LOGICAL.contains(upper)
        || MATH.contains(upper)
        || DATE.contains(upper)
        || STRING.contains(upper)
        || OTHER.contains(upper)
        || AGGREGATE.contains(upper)
}

/// Is this an aggregate function (SUM, AVG, COUNT, MAX, MIN, GROUP_CONCAT)?
pub fn is_aggregate_function(name: &str) -> bool {
    AGGREGATE.contains(name.to_uppercase().as_str())
}

/// Is this an arithmetic operator?
pub fn is_operator(name: &str) -> bool {
    OPERATORS.contains(name)
}

/// Is this a comparison operator?
pub fn is_comparison_operator(name: &str) -> bool {
    COMPARISON.contains(name)
}

/// Is this a logical operator (symbol or keyword form)?
pub fn is_logical_operator(name: &str) -> bool {
    LOGICAL.contains(name.to_uppercase().as_str())
}

/// Is this a math function?
pub fn is_math_function(name: &str) -> bool {
    MATH.contains(name.to_uppercase().as_str())
}

/// Is this a date or time function?
pub fn is_date_function(name: &str) -> bool {
    DATE.contains(name.to_uppercase().as_str())
}

/// Is this a string function?
pub fn is_string_function(name: &str) -> bool {
    STRING.contains(name.to_uppercase().as_str())
}

/// Translate an expression operator to its SQL spelling.
///
/// Operators not listed here pass through unchanged.
pub fn to_sql_operator(op: &str) -> &str {
    match op {
        "==" | "===" => "=",
        "!=" | "!==" => "<>",
        "&&" => "AND",
        "||" => "OR",
        "!" => "NOT",
        _ => op,
    }
}
