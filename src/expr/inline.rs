//! Detection of expressions embedded directly in select lists.
//!
//! A request may put an expression straight into its column list
//! (`YEAR(orderdate) AS orderYear`, `totaldue - discount`) instead of
//! declaring a calculated field. These heuristics spot such entries and
//! promote them to anonymous [`CalculatedFieldDef`]s; plain column names
//! and simple `column AS alias` entries are left alone.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::CalculatedFieldDef;

/// Trailing `AS alias` on a select entry.
static AS_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^(.+?)\s+as\s+([A-Za-z_][A-Za-z0-9_$]*)$").unwrap());

/// A bare, possibly qualified column name.
static SIMPLE_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)?$").unwrap()
});

/// A function call (`NAME( ... )`).
static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^[A-Za-z_][A-Za-z0-9_]*\s*\(.*\)$").unwrap());

/// An infix operator outside of any obvious quoting.
static OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\-*/%]|==|!=|>=|<=|>|<|&&|\|\|").unwrap());

/// Promote a select-list entry to an anonymous calculated field.
///
/// Returns `None` for plain column names and simple aliases; those pass
/// through the select list untouched. The returned definition is named
/// after the alias when one is present, otherwise after the expression
/// text itself.
pub fn detect(entry: &str) -> Option<CalculatedFieldDef> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    let (expression, alias) = match AS_ALIAS.captures(entry) {
        Some(caps) => (
            caps.get(1).unwrap().as_str().trim(),
            Some(caps.get(2).unwrap().as_str()),
        ),
        None => (entry, None),
    };

    if SIMPLE_COLUMN.is_match(expression) {
        return None;
    }

    if !FUNCTION_CALL.is_match(expression) && !OPERATOR.is_match(expression) {
        return None;
    }

    let name = alias.unwrap_or(expression);
    Some(CalculatedFieldDef::new(name, expression))
}
