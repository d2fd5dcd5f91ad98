//! Per-request resolution context for calculated field compilation.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::expr::factory::Fragment;
use crate::model::{CalculatedColumn, PhysicalColumn, QueryModel};

/// A name resolved by the context.
#[derive(Debug)]
pub enum ResolvedColumn<'a, F: Fragment> {
    /// A previously registered calculated column.
    Calculated(&'a CalculatedColumn<F>),
    /// A physical column from the query model.
    Physical(PhysicalColumn),
}

/// Resolution context for one query compilation.
///
/// Calculated columns are looked up before the physical model, which is
/// what lets later field definitions build on earlier ones. A field can
/// never reference itself: its name only registers after it compiles.
pub struct ExprContext<'m, F: Fragment> {
    model: &'m dyn QueryModel,
    columns: Vec<CalculatedColumn<F>>,
    index: HashMap<String, usize>,
}

impl<'m, F: Fragment> ExprContext<'m, F> {
    pub fn new(model: &'m dyn QueryModel) -> Self {
        Self {
            model,
            columns: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Does this name resolve to any column, calculated or physical?
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name) || self.model.find_column(name).is_some()
    }

    /// Resolve a name, calculated columns first.
    pub fn resolve_column(&self, name: &str) -> Result<ResolvedColumn<'_, F>> {
        self.try_resolve_column(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Resolve a name, returning `None` when nothing matches.
    pub fn try_resolve_column(&self, name: &str) -> Option<ResolvedColumn<'_, F>> {
        if let Some(&i) = self.index.get(name) {
            return Some(ResolvedColumn::Calculated(&self.columns[i]));
        }
        self.model.find_column(name).map(ResolvedColumn::Physical)
    }

    /// Register a compiled column.
    ///
    /// The compiler has already rejected duplicate names; a repeated
    /// registration would shadow the earlier entry in the index.
    pub fn register_calculated_column(&mut self, column: CalculatedColumn<F>) {
        self.index.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
    }

    /// Registered calculated columns, in registration order.
    pub fn calculated_columns(&self) -> &[CalculatedColumn<F>] {
        &self.columns
    }
}
