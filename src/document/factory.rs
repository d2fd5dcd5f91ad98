//! Document node factory: lowers AST nodes into [`DocumentFragment`]s.

use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::expr::ast::Literal;
use crate::expr::context::{ExprContext, ResolvedColumn};
use crate::expr::factory::NodeFactory;
use crate::expr::{functions, infer};
use crate::model::{Aggregation, ColumnType};

use super::fragment::DocumentFragment;

/// Builds aggregation-pipeline fragments.
///
/// Covers the same function surface as the SQL factory. Allowed
/// functions the pipeline grammar cannot express fail with
/// [`Error::FunctionNotSupported`] rather than degrading silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFactory;

impl DocumentFactory {
    pub fn new() -> Self {
        Self
    }
}

/// Pipeline operator for an infix operator spelling.
fn binary_operator(op: &str) -> Option<&'static str> {
    match op {
        "+" => Some("$add"),
        "-" => Some("$subtract"),
        "*" => Some("$multiply"),
        "/" => Some("$divide"),
        "%" => Some("$mod"),
        "==" | "===" => Some("$eq"),
        "!=" | "!==" => Some("$ne"),
        ">" => Some("$gt"),
        ">=" => Some("$gte"),
        "<" => Some("$lt"),
        "<=" => Some("$lte"),
        "&&" => Some("$and"),
        "||" => Some("$or"),
        _ => match op.to_uppercase().as_str() {
            "AND" => Some("$and"),
            "OR" => Some("$or"),
            _ => None,
        },
    }
}

/// Argument expression at position `i`, or pipeline null when absent.
fn arg(args: &[DocumentFragment], i: usize) -> Value {
    args.get(i).map(|a| a.expression.clone()).unwrap_or(Value::Null)
}

impl NodeFactory for DocumentFactory {
    type Fragment = DocumentFragment;

    fn identifier(
        &self,
        cx: &ExprContext<'_, DocumentFragment>,
        name: &str,
    ) -> Result<DocumentFragment> {
        match cx.resolve_column(name)? {
            // Reuse the registered expression tree. Its aggregate state
            // is not carried over: has_aggregate only describes this
            // fragment's own sub-tree.
            ResolvedColumn::Calculated(col) => Ok(DocumentFragment {
                expression: col.fragment.expression.clone(),
                referenced_columns: col.fragment.referenced_columns.clone(),
                inferred_type: col.fragment.inferred_type,
                has_aggregate: false,
                aggregation: None,
            }),
            ResolvedColumn::Physical(col) => {
                let mut frag = DocumentFragment::raw(
                    json!(format!("${}", col.field_name)),
                    col.column_type,
                );
                frag.referenced_columns.push(col.to_ref());
                Ok(frag)
            }
        }
    }

    fn literal(&self, lit: &Literal) -> Result<DocumentFragment> {
        Ok(match lit {
            Literal::Str(s) => {
                // A leading `$` would read as a field path; escape it.
                let expr = if s.starts_with('$') {
                    json!({ "$literal": s })
                } else {
                    json!(s)
                };
                DocumentFragment::raw(expr, ColumnType::Text)
            }
            Literal::Int(i) => DocumentFragment::raw(json!(i), ColumnType::Integer),
            Literal::Float(f) => DocumentFragment::raw(json!(f), ColumnType::Number),
            Literal::Bool(b) => DocumentFragment::raw(json!(b), ColumnType::Bool),
            Literal::Null => DocumentFragment::raw(Value::Null, ColumnType::Unknown),
        })
    }

    fn unary(&self, op: &str, operand: DocumentFragment) -> Result<DocumentFragment> {
        let expression = match op {
            // Binary subtraction keeps the operand's numeric type.
            "-" => json!({ "$subtract": [0, operand.expression] }),
            "!" | "NOT" => json!({ "$not": [operand.expression] }),
            _ => {
                return Err(Error::FunctionNotSupported {
                    name: op.to_string(),
                    backend: "document",
                })
            }
        };
        Ok(DocumentFragment {
            expression,
            referenced_columns: operand.referenced_columns,
            inferred_type: infer::unary_result_type(op, operand.inferred_type),
            has_aggregate: operand.has_aggregate,
            aggregation: operand.aggregation,
        })
    }

    fn binary(
        &self,
        op: &str,
        left: DocumentFragment,
        right: DocumentFragment,
    ) -> Result<DocumentFragment> {
        let pipeline_op = binary_operator(op).ok_or_else(|| Error::FunctionNotSupported {
            name: op.to_string(),
            backend: "document",
        })?;

        let mut frag = DocumentFragment {
            expression: json!({ pipeline_op: [left.expression, right.expression] }),
            referenced_columns: left.referenced_columns,
            inferred_type: infer::binary_result_type(op, left.inferred_type, right.inferred_type),
            has_aggregate: left.has_aggregate || right.has_aggregate,
            // A composite is no longer a single aggregate application.
            aggregation: None,
        };
        frag.extend_references(right.referenced_columns);
        Ok(frag)
    }

    fn function(&self, name: &str, args: Vec<DocumentFragment>) -> Result<DocumentFragment> {
        let upper = name.to_uppercase();
        if !functions::is_allowed(&upper) {
            return Err(Error::FunctionNotAllowed(name.to_string()));
        }

        let expression = match upper.as_str() {
            // Math
            "ABS" => json!({ "$abs": arg(&args, 0) }),
            "ROUND" => json!({ "$round": [arg(&args, 0), arg(&args, 1)] }),
            "CEIL" | "CEILING" => json!({ "$ceil": arg(&args, 0) }),
            "FLOOR" => json!({ "$floor": arg(&args, 0) }),
            "MOD" => json!({ "$mod": [arg(&args, 0), arg(&args, 1)] }),
            "POWER" | "POW" => json!({ "$pow": [arg(&args, 0), arg(&args, 1)] }),
            "SQRT" => json!({ "$sqrt": arg(&args, 0) }),
            "TRUNCATE" | "TRUNC" => json!({ "$trunc": [arg(&args, 0), arg(&args, 1)] }),

            // Date and time
            "YEAR" => json!({ "$year": arg(&args, 0) }),
            "MONTH" => json!({ "$month": arg(&args, 0) }),
            "DAY" => json!({ "$dayOfMonth": arg(&args, 0) }),
            "HOUR" => json!({ "$hour": arg(&args, 0) }),
            "MINUTE" => json!({ "$minute": arg(&args, 0) }),
            "SECOND" => json!({ "$second": arg(&args, 0) }),
            "NOW" | "CURRENT_TIMESTAMP" | "CURRENT_DATE" | "CURRENT_TIME" => json!("$$NOW"),
            "DATEDIFF" => json!({ "$dateDiff": {
                "startDate": arg(&args, 1),
                "endDate": arg(&args, 0),
                "unit": "day",
            }}),
            "DATE_FORMAT" => json!({ "$dateToString": {
                "date": arg(&args, 0),
                "format": arg(&args, 1),
            }}),
            "STR_TO_DATE" => json!({ "$dateFromString": {
                "dateString": arg(&args, 0),
                "format": arg(&args, 1),
            }}),

            // Strings
            "CONCAT" => {
                let parts: Vec<Value> = args.iter().map(|a| a.expression.clone()).collect();
                json!({ "$concat": parts })
            }
            "CONCAT_WS" => {
                // Separator is the first argument; interleave it.
                let sep = arg(&args, 0);
                let mut parts = Vec::new();
                for (i, a) in args.iter().skip(1).enumerate() {
                    if i > 0 {
                        parts.push(sep.clone());
                    }
                    parts.push(a.expression.clone());
                }
                json!({ "$concat": parts })
            }
            "SUBSTRING" | "SUBSTR" => {
                json!({ "$substrCP": [arg(&args, 0), arg(&args, 1), arg(&args, 2)] })
            }
            "LEFT" => json!({ "$substrCP": [arg(&args, 0), 0, arg(&args, 1)] }),
            "UPPER" => json!({ "$toUpper": arg(&args, 0) }),
            "LOWER" => json!({ "$toLower": arg(&args, 0) }),
            "TRIM" => json!({ "$trim": { "input": arg(&args, 0) } }),
            "LTRIM" => json!({ "$ltrim": { "input": arg(&args, 0) } }),
            "RTRIM" => json!({ "$rtrim": { "input": arg(&args, 0) } }),
            "LENGTH" | "CHAR_LENGTH" => json!({ "$strLenCP": arg(&args, 0) }),
            "REPLACE" => json!({ "$replaceAll": {
                "input": arg(&args, 0),
                "find": arg(&args, 1),
                "replacement": arg(&args, 2),
            }}),
            "INSTR" => json!({ "$indexOfCP": [arg(&args, 0), arg(&args, 1)] }),
            // LOCATE(substr, str) searches its second argument
            "LOCATE" => json!({ "$indexOfCP": [arg(&args, 1), arg(&args, 0)] }),

            // Conditionals
            "COALESCE" | "IFNULL" | "NVL" | "ISNULL" => {
                let parts: Vec<Value> = args.iter().map(|a| a.expression.clone()).collect();
                json!({ "$ifNull": parts })
            }
            "NULLIF" => json!({ "$cond": [
                { "$eq": [arg(&args, 0), arg(&args, 1)] },
                Value::Null,
                arg(&args, 0),
            ]}),
            "IF" => json!({ "$cond": [arg(&args, 0), arg(&args, 1), arg(&args, 2)] }),

            // Aggregates
            "SUM" => json!({ "$sum": arg(&args, 0) }),
            "AVG" => json!({ "$avg": arg(&args, 0) }),
            "MAX" => json!({ "$max": arg(&args, 0) }),
            "MIN" => json!({ "$min": arg(&args, 0) }),
            // The pipeline counts by summing ones.
            "COUNT" => json!({ "$sum": 1 }),
            "GROUP_CONCAT" => json!({ "$push": arg(&args, 0) }),

            // Allowed for SQL but inexpressible here.
            _ => {
                return Err(Error::FunctionNotSupported {
                    name: upper,
                    backend: "document",
                })
            }
        };

        let arg_types: Vec<ColumnType> = args.iter().map(|a| a.inferred_type).collect();
        let mut frag =
            DocumentFragment::raw(expression, infer::function_result_type(&upper, &arg_types));
        for a in args {
            frag.extend_references(a.referenced_columns);
            frag.has_aggregate |= a.has_aggregate;
        }

        if functions::is_aggregate_function(&upper) {
            frag.has_aggregate = true;
            frag.aggregation = Aggregation::from_str(&upper);
        }

        Ok(frag)
    }
}
