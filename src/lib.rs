//! # Quarry
//!
//! Compiles calculated-field expressions into backend query fragments
//! and plans join paths for multi-table requests.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │       Field definitions (name, expression, agg?)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [expr::parser]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Expression AST (allow-listed)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler + sql/document factory]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Fragments: SQL text + params, or pipeline trees        │
//! └─────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────┐
//! │         Requested tables (dimensions, facts)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner::JoinGraph]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Ordered, minimal, cycle-free join edges           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The downstream query assembler merges the two outputs into a full
//! SQL statement or aggregation pipeline; that part is not this crate.
//!
//! Expressions may only call operators and functions on the allow-list
//! in [`expr::functions`]; anything else fails compilation with a
//! security error before reaching any backend.

pub mod compiler;
pub mod document;
pub mod error;
pub mod expr;
pub mod model;
pub mod planner;
pub mod sql;

pub use error::{Error, Result};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compiler::FieldCompiler;
    pub use crate::document::{DocumentFactory, DocumentFragment};
    pub use crate::error::{Error, Result};
    pub use crate::expr::{ExprContext, Fragment, NodeFactory};
    pub use crate::model::{
        Aggregation, CalculatedColumn, CalculatedFieldDef, ColumnRef, ColumnType, PhysicalColumn,
        QueryModel,
    };
    pub use crate::planner::{JoinEdge, JoinGraph, JoinOn, JoinType, QueryTable};
    pub use crate::sql::{Dialect, SqlFactory, SqlFragment};
}
