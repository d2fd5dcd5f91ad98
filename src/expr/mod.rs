//! Calculated field expression language.
//!
//! The pieces, in compilation order: [`parser`] turns source text into an
//! [`ast::Expr`], [`functions`] gates what the expression may call,
//! [`factory`] defines the backend seam, and [`context`] resolves names
//! while [`ast::Expr::lower`] walks the tree. [`inline`] detects
//! expressions embedded directly in select lists.

pub mod ast;
pub mod context;
pub mod factory;
pub mod functions;
pub mod infer;
pub mod inline;
pub mod parser;

pub use ast::{Expr, Literal};
pub use context::{ExprContext, ResolvedColumn};
pub use factory::{Fragment, NodeFactory};
pub use parser::{parse, ParseError};
