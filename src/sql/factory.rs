//! SQL node factory: lowers AST nodes into [`SqlFragment`]s.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::expr::ast::Literal;
use crate::expr::context::{ExprContext, ResolvedColumn};
use crate::expr::factory::NodeFactory;
use crate::expr::{functions, infer};
use crate::model::{Aggregation, ColumnType};
use crate::sql::dialect::Dialect;
use crate::sql::fragment::SqlFragment;

/// Builds SQL fragments for one target dialect.
///
/// String literals become `?` placeholders with the value bound on the
/// fragment; numeric, boolean, and null literals are inlined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFactory {
    dialect: Dialect,
}

impl SqlFactory {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl NodeFactory for SqlFactory {
    type Fragment = SqlFragment;

    fn identifier(
        &self,
        cx: &ExprContext<'_, SqlFragment>,
        name: &str,
    ) -> Result<SqlFragment> {
        match cx.resolve_column(name)? {
            // Reuse the registered fragment's text and bindings. Its
            // aggregate state is not carried over: has_aggregate only
            // describes this fragment's own sub-tree.
            ResolvedColumn::Calculated(col) => Ok(SqlFragment {
                sql: col.fragment.sql.clone(),
                params: col.fragment.params.clone(),
                referenced_columns: col.fragment.referenced_columns.clone(),
                inferred_type: col.fragment.inferred_type,
                has_aggregate: false,
                aggregation: None,
            }),
            ResolvedColumn::Physical(col) => {
                let mut frag = SqlFragment::raw(col.declare_sql(), col.column_type);
                frag.referenced_columns.push(col.to_ref());
                Ok(frag)
            }
        }
    }

    fn literal(&self, lit: &Literal) -> Result<SqlFragment> {
        Ok(match lit {
            Literal::Str(s) => {
                let mut frag = SqlFragment::raw("?", ColumnType::Text);
                frag.params.push(Value::String(s.clone()));
                frag
            }
            Literal::Int(i) => SqlFragment::raw(i.to_string(), ColumnType::Integer),
            Literal::Float(f) => {
                let mut buf = ryu::Buffer::new();
                SqlFragment::raw(buf.format(*f).to_string(), ColumnType::Number)
            }
            Literal::Bool(b) => {
                SqlFragment::raw(if *b { "TRUE" } else { "FALSE" }, ColumnType::Bool)
            }
            Literal::Null => SqlFragment::raw("NULL", ColumnType::Unknown),
        })
    }

    fn unary(&self, op: &str, operand: SqlFragment) -> Result<SqlFragment> {
        let sql_op = functions::to_sql_operator(op);
        let sql = match sql_op {
            "-" => format!("(-{})", operand.sql),
            _ => format!("({} {})", sql_op, operand.sql),
        };
        Ok(SqlFragment {
            sql,
            params: operand.params,
            referenced_columns: operand.referenced_columns,
            inferred_type: infer::unary_result_type(op, operand.inferred_type),
            has_aggregate: operand.has_aggregate,
            aggregation: operand.aggregation,
        })
    }

    fn binary(&self, op: &str, left: SqlFragment, right: SqlFragment) -> Result<SqlFragment> {
        let sql_op = functions::to_sql_operator(op);
        let mut frag = SqlFragment {
            sql: format!("({} {} {})", left.sql, sql_op, right.sql),
            params: left.params,
            referenced_columns: left.referenced_columns,
            inferred_type: infer::binary_result_type(op, left.inferred_type, right.inferred_type),
            has_aggregate: left.has_aggregate || right.has_aggregate,
            // A composite is no longer a single aggregate application.
            aggregation: None,
        };
        frag.params.extend(right.params);
        frag.extend_references(right.referenced_columns);
        Ok(frag)
    }

    fn function(&self, name: &str, args: Vec<SqlFragment>) -> Result<SqlFragment> {
        let upper = name.to_uppercase();
        if !functions::is_allowed(&upper) {
            return Err(Error::FunctionNotAllowed(name.to_string()));
        }

        let emitted = self.dialect.remap_function(&upper);
        let arg_sql: Vec<&str> = args.iter().map(|a| a.sql.as_str()).collect();
        let sql = format!("{}({})", emitted, arg_sql.join(", "));

        let arg_types: Vec<ColumnType> = args.iter().map(|a| a.inferred_type).collect();
        let inferred_type = infer::function_result_type(&upper, &arg_types);

        let mut frag = SqlFragment::raw(sql, inferred_type);
        for arg in args {
            frag.params.extend(arg.params);
            frag.extend_references(arg.referenced_columns);
            frag.has_aggregate |= arg.has_aggregate;
        }

        if functions::is_aggregate_function(&upper) {
            frag.has_aggregate = true;
            frag.aggregation = Aggregation::from_str(&upper);
        }

        Ok(frag)
    }
}
