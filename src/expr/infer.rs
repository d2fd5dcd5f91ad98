//! Type inference rules shared by the SQL and document backends.
//!
//! Both backends must agree on the inferred type of an expression, so
//! the rules live here rather than in either factory. Inference is best
//! effort: anything not covered falls back to [`ColumnType::Unknown`].

use crate::expr::functions;
use crate::model::ColumnType;

/// Result type of a binary operator application.
pub fn binary_result_type(op: &str, left: ColumnType, right: ColumnType) -> ColumnType {
    if functions::is_comparison_operator(op) || functions::is_logical_operator(op) {
        return ColumnType::Bool;
    }
    if functions::is_operator(op) {
        // Integer arithmetic stays integral except under division.
        if left == ColumnType::Integer && right == ColumnType::Integer && op != "/" {
            return ColumnType::Integer;
        }
        return ColumnType::Number;
    }
    ColumnType::Unknown
}

/// Result type of a prefix operator application.
pub fn unary_result_type(op: &str, operand: ColumnType) -> ColumnType {
    match op {
        "!" | "NOT" => ColumnType::Bool,
        "-" => {
            if operand.is_numeric() {
                operand
            } else {
                ColumnType::Number
            }
        }
        _ => ColumnType::Unknown,
    }
}

/// Result type of a function call. `name` must already be uppercased.
pub fn function_result_type(name: &str, arg_types: &[ColumnType]) -> ColumnType {
    let first = arg_types.first().copied().unwrap_or(ColumnType::Unknown);

    match name {
        // Aggregates
        "COUNT" => ColumnType::Integer,
        "SUM" | "AVG" => ColumnType::Number,
        "MIN" | "MAX" => first,
        "GROUP_CONCAT" => ColumnType::Text,

        // Date parts and distances are integral
        "YEAR" | "MONTH" | "DAY" | "HOUR" | "MINUTE" | "SECOND" | "DATEDIFF"
        | "TIMESTAMPDIFF" | "EXTRACT" => ColumnType::Integer,
        "DATE" | "TIME" | "NOW" | "CURRENT_DATE" | "CURRENT_TIME" | "CURRENT_TIMESTAMP"
        | "DATE_ADD" | "DATE_SUB" | "STR_TO_DATE" => ColumnType::Datetime,
        "DATE_FORMAT" => ColumnType::Text,

        // String functions yield text except the counting/position ones
        "LENGTH" | "CHAR_LENGTH" | "INSTR" | "LOCATE" => ColumnType::Integer,
        _ if functions::is_string_function(name) => ColumnType::Text,

        // Math
        "ABS" => first,
        "SIGN" | "MOD" => ColumnType::Integer,
        _ if functions::is_math_function(name) => ColumnType::Number,

        // Conditionals take their value branch's type
        "COALESCE" | "NULLIF" | "IFNULL" | "NVL" | "ISNULL" => first,
        "IF" => arg_types.get(1).copied().unwrap_or(ColumnType::Unknown),

        _ => ColumnType::Unknown,
    }
}
