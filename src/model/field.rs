//! Calculated field definitions and their compiled form.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::expr::ast::Expr;
use crate::expr::factory::Fragment;
use crate::model::types::{Aggregation, ColumnType};

/// A parsed expression together with its source text.
///
/// Parsing is pure, so the same source always produces a structurally
/// identical tree; a cached copy can safely stand in for a re-parse.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    pub source: String,
    pub root: Expr,
}

/// Caller-supplied definition of one calculated field.
///
/// Definitions are plain request data; the compiler turns them into
/// [`CalculatedColumn`]s. The parse result is cached on the definition
/// so repeated compilations of the same request skip the parser.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CalculatedFieldDef {
    /// Field name, unique within the request.
    pub name: String,

    /// Expression source text (e.g., `price * qty`).
    pub expression: String,

    /// Display caption. Defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Aggregation to apply when the expression carries none of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg: Option<String>,

    /// Parse cache, populated on first compilation.
    #[serde(skip)]
    compiled: OnceLock<CompiledExpr>,
}

impl CalculatedFieldDef {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            ..Default::default()
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_agg(mut self, agg: impl Into<String>) -> Self {
        self.agg = Some(agg.into());
        self
    }

    /// Cached AST from an earlier compilation, if any.
    pub fn compiled(&self) -> Option<&CompiledExpr> {
        self.compiled.get()
    }

    /// Store a freshly parsed AST, returning the cached copy.
    ///
    /// Concurrent first compilations may race here; the first write wins
    /// and the loser's identical tree is dropped.
    pub(crate) fn cache_compiled(&self, source: String, root: Expr) -> &CompiledExpr {
        self.compiled.get_or_init(|| CompiledExpr { source, root })
    }
}

/// A registered calculated column and its lowered fragment.
///
/// Built once per field definition per request, registered in the
/// expression context, and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CalculatedColumn<F: Fragment> {
    pub name: String,
    pub caption: String,
    pub description: Option<String>,
    pub fragment: F,
}

impl<F: Fragment> CalculatedColumn<F> {
    /// Inferred type of the underlying expression.
    pub fn column_type(&self) -> ColumnType {
        self.fragment.inferred_type()
    }

    /// Does the expression itself contain an aggregate call?
    pub fn has_aggregate(&self) -> bool {
        self.fragment.has_aggregate()
    }

    /// Aggregation carried by the fragment, from an aggregate call or
    /// the field definition's `agg` hint.
    pub fn aggregation(&self) -> Option<Aggregation> {
        self.fragment.aggregation()
    }
}
