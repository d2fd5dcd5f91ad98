//! Calculated field compilation.
//!
//! [`FieldCompiler`] turns caller-supplied [`CalculatedFieldDef`]s into
//! registered [`CalculatedColumn`]s: validate, parse (or reuse the
//! definition's cached AST), lower through the backend factory, apply
//! the `agg` hint, and register the result so later definitions in the
//! same batch can reference it.

use tracing::debug;

use crate::error::{Error, Result};
use crate::expr::context::ExprContext;
use crate::expr::factory::{Fragment, NodeFactory};
use crate::expr::parser;
use crate::model::{Aggregation, CalculatedColumn, CalculatedFieldDef};

/// Compiles calculated field definitions for one backend.
///
/// The factory fixes the fragment type, so a compiler built with
/// [`SqlFactory`](crate::sql::SqlFactory) can only yield SQL columns and
/// one built with [`DocumentFactory`](crate::document::DocumentFactory)
/// only document columns.
#[derive(Debug, Clone, Default)]
pub struct FieldCompiler<F: NodeFactory> {
    factory: F,
}

impl<F: NodeFactory> FieldCompiler<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Compile a batch of definitions, in order.
    ///
    /// The first failure aborts the batch; definitions compiled before
    /// it stay registered in the context.
    pub fn process_fields(
        &self,
        defs: &[CalculatedFieldDef],
        cx: &mut ExprContext<'_, F::Fragment>,
    ) -> Result<Vec<CalculatedColumn<F::Fragment>>> {
        let mut columns = Vec::with_capacity(defs.len());
        for def in defs {
            columns.push(self.compile_field(def, cx)?);
        }
        Ok(columns)
    }

    /// Compile one definition and register it in the context.
    pub fn compile_field(
        &self,
        def: &CalculatedFieldDef,
        cx: &mut ExprContext<'_, F::Fragment>,
    ) -> Result<CalculatedColumn<F::Fragment>> {
        self.compile_inner(def, cx).map_err(|e| {
            // The allow-list rejection keeps its distinct signal.
            if e.is_security() {
                e
            } else {
                Error::FieldCompile {
                    name: def.name.clone(),
                    source: Box::new(e),
                }
            }
        })
    }

    fn compile_inner(
        &self,
        def: &CalculatedFieldDef,
        cx: &mut ExprContext<'_, F::Fragment>,
    ) -> Result<CalculatedColumn<F::Fragment>> {
        let name = def.name.trim();
        if name.is_empty() || def.expression.trim().is_empty() {
            return Err(Error::BlankFieldDef);
        }
        if cx.has_column(name) {
            return Err(Error::DuplicateColumn(name.to_string()));
        }

        let compiled = match def.compiled() {
            Some(cached) => {
                debug!(field = name, "reusing cached expression AST");
                cached
            }
            None => {
                let root = parser::parse(&def.expression)?;
                def.cache_compiled(def.expression.clone(), root)
            }
        };

        let mut fragment = compiled.root.lower(&self.factory, cx)?;

        // The agg hint only applies when the expression carries no
        // aggregation of its own, and it never sets has_aggregate.
        if let Some(agg) = &def.agg {
            if fragment.aggregation().is_none() {
                let agg = Aggregation::from_str(agg)
                    .ok_or_else(|| Error::InvalidAggregation(agg.clone()))?;
                fragment.set_inferred_aggregation(agg);
            }
        }

        debug!(
            field = name,
            has_aggregate = fragment.has_aggregate(),
            "compiled calculated field"
        );

        let column = CalculatedColumn {
            name: name.to_string(),
            caption: def.caption.clone().unwrap_or_else(|| name.to_string()),
            description: def.description.clone(),
            fragment,
        };
        cx.register_calculated_column(column.clone());
        Ok(column)
    }
}
