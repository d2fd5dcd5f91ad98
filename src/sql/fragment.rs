//! Compiled SQL fragments.

use serde_json::Value;

use crate::expr::factory::Fragment;
use crate::model::{Aggregation, ColumnRef, ColumnType};

/// A compiled piece of SQL.
///
/// `sql` may contain `?` placeholders; `params` holds the bound values
/// in placeholder order. Fragments compose: combining two fragments
/// concatenates their parameter lists left to right, matching the order
/// their placeholders appear in the combined text.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// Generated SQL text.
    pub sql: String,

    /// Bound values, one per `?` in `sql`, in order.
    pub params: Vec<Value>,

    /// Physical columns the expression touches, in first-use order.
    pub referenced_columns: Vec<ColumnRef>,

    /// Best-effort inferred type.
    pub inferred_type: ColumnType,

    /// True when this fragment's own sub-tree contains an aggregate call.
    pub has_aggregate: bool,

    /// Aggregation from an aggregate call, or the field definition's
    /// `agg` hint when the expression carried none.
    pub aggregation: Option<Aggregation>,
}

impl SqlFragment {
    /// A fragment with no parameters, references, or aggregation.
    pub fn raw(sql: impl Into<String>, inferred_type: ColumnType) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            referenced_columns: Vec::new(),
            inferred_type,
            has_aggregate: false,
            aggregation: None,
        }
    }

    /// Append column references, skipping ones already recorded.
    pub(crate) fn extend_references<I>(&mut self, refs: I)
    where
        I: IntoIterator<Item = ColumnRef>,
    {
        for r in refs {
            if !self.referenced_columns.contains(&r) {
                self.referenced_columns.push(r);
            }
        }
    }
}

impl Fragment for SqlFragment {
    fn inferred_type(&self) -> ColumnType {
        self.inferred_type
    }

    fn has_aggregate(&self) -> bool {
        self.has_aggregate
    }

    fn aggregation(&self) -> Option<Aggregation> {
        self.aggregation
    }

    fn set_inferred_aggregation(&mut self, agg: Aggregation) {
        self.aggregation = Some(agg);
    }

    fn referenced_columns(&self) -> &[ColumnRef] {
        &self.referenced_columns
    }
}

impl std::fmt::Display for SqlFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql)
    }
}
