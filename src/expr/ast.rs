//! Expression AST and the lowering walk.

use crate::error::{Error, Result};
use crate::expr::context::ExprContext;
use crate::expr::factory::NodeFactory;
use crate::expr::functions;

/// A literal value in an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// A parsed calculated field expression.
///
/// Immutable once built. Operators keep their source spelling (`"=="`,
/// `"&&"`, `"AND"`, ...); backends translate them when lowering.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column reference, possibly qualified (`t.price`).
    Identifier(String),

    Literal(Literal),

    /// Prefix operator application (`-x`, `!x`, `NOT x`).
    Unary { op: String, operand: Box<Expr> },

    /// Infix operator application.
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Function call.
    Function { name: String, args: Vec<Expr> },

    /// Parenthesized sub-expression. Grouping only, no semantics of
    /// its own; lowering passes straight through.
    Paren(Box<Expr>),
}

impl Expr {
    /// Lower this expression into a backend fragment.
    ///
    /// A function's name is checked against the allow-list before its
    /// arguments are lowered, so a disallowed call always fails with the
    /// security error even when its arguments are themselves invalid.
    pub fn lower<F: NodeFactory>(
        &self,
        factory: &F,
        cx: &ExprContext<'_, F::Fragment>,
    ) -> Result<F::Fragment> {
        match self {
            Expr::Identifier(name) => factory.identifier(cx, name),
            Expr::Literal(lit) => factory.literal(lit),
            Expr::Unary { op, operand } => {
                let operand = operand.lower(factory, cx)?;
                factory.unary(op, operand)
            }
            Expr::Binary { op, left, right } => {
                let left = left.lower(factory, cx)?;
                let right = right.lower(factory, cx)?;
                factory.binary(op, left, right)
            }
            Expr::Function { name, args } => {
                if !functions::is_allowed(name) {
                    return Err(Error::FunctionNotAllowed(name.clone()));
                }
                let args = args
                    .iter()
                    .map(|a| a.lower(factory, cx))
                    .collect::<Result<Vec<_>>>()?;
                factory.function(name, args)
            }
            Expr::Paren(inner) => inner.lower(factory, cx),
        }
    }
}
