//! Backend seams: the fragment contract and the per-node factory.

use crate::error::Result;
use crate::expr::ast::Literal;
use crate::expr::context::ExprContext;
use crate::model::{Aggregation, ColumnRef, ColumnType};

/// Contract every backend fragment satisfies.
///
/// A fragment is the compiled form of one (sub-)expression: executable
/// content plus the metadata the compiler and downstream assembly need.
pub trait Fragment: Clone + std::fmt::Debug {
    /// Inferred data type of the expression.
    fn inferred_type(&self) -> ColumnType;

    /// True only when this fragment's own sub-tree contains an
    /// aggregate function call. The field definition's `agg` hint
    /// never sets this.
    fn has_aggregate(&self) -> bool;

    /// Aggregation carried by this fragment, if any.
    fn aggregation(&self) -> Option<Aggregation>;

    /// Attach the field definition's `agg` hint.
    ///
    /// Leaves [`has_aggregate`](Fragment::has_aggregate) untouched, so
    /// callers can still tell "already aggregated" from "needs wrapping".
    fn set_inferred_aggregation(&mut self, agg: Aggregation);

    /// Physical columns referenced by the expression, in first-use order.
    fn referenced_columns(&self) -> &[ColumnRef];
}

/// Per-node construction of backend fragments.
///
/// The lowering walk in [`Expr::lower`](crate::expr::ast::Expr::lower)
/// hands each AST node to one of these methods. The associated type pins
/// the result: a factory can only produce its own fragment kind, so a
/// mismatched result is a compile error rather than a runtime check.
pub trait NodeFactory {
    type Fragment: Fragment;

    /// Resolve an identifier to a column fragment.
    fn identifier(
        &self,
        cx: &ExprContext<'_, Self::Fragment>,
        name: &str,
    ) -> Result<Self::Fragment>;

    /// Build a literal fragment.
    fn literal(&self, lit: &Literal) -> Result<Self::Fragment>;

    /// Apply a prefix operator.
    fn unary(&self, op: &str, operand: Self::Fragment) -> Result<Self::Fragment>;

    /// Apply an infix operator.
    fn binary(
        &self,
        op: &str,
        left: Self::Fragment,
        right: Self::Fragment,
    ) -> Result<Self::Fragment>;

    /// Apply a function call.
    fn function(&self, name: &str, args: Vec<Self::Fragment>) -> Result<Self::Fragment>;
}
