//! Physical column descriptions and the query model seam.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// A selectable physical column, as resolved by the query model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalColumn {
    /// Logical name used in expressions (e.g., "orderDate").
    pub name: String,

    /// Alias of the table this column lives on (e.g., "t0").
    pub table_alias: String,

    /// Physical column or field name in the store.
    pub field_name: String,

    /// Declared data type.
    pub column_type: ColumnType,

    /// SQL text override for columns that are not plain references,
    /// such as JSON extractions (`t0.addr_info ->> '$.company'`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declare: Option<String>,
}

impl PhysicalColumn {
    pub fn new(
        name: impl Into<String>,
        table_alias: impl Into<String>,
        field_name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            name: name.into(),
            table_alias: table_alias.into(),
            field_name: field_name.into(),
            column_type,
            declare: None,
        }
    }

    pub fn with_declare(mut self, declare: impl Into<String>) -> Self {
        self.declare = Some(declare.into());
        self
    }

    /// SQL select text for this column.
    ///
    /// Defaults to `alias.field`; the `declare` override wins when set.
    pub fn declare_sql(&self) -> String {
        match &self.declare {
            Some(d) => d.clone(),
            None => format!("{}.{}", self.table_alias, self.field_name),
        }
    }

    /// Reference entry recorded on fragments that use this column.
    pub fn to_ref(&self) -> ColumnRef {
        ColumnRef {
            table_alias: self.table_alias.clone(),
            column: self.field_name.clone(),
        }
    }
}

/// A qualified column reference tracked on compiled fragments.
///
/// Downstream join analysis uses these to decide which tables an
/// expression actually touches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table_alias: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table_alias: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table_alias: table_alias.into(),
            column: column.into(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table_alias, self.column)
    }
}

/// Lookup seam into the caller's query model.
///
/// The compiler resolves every identifier that is not a calculated
/// column through this trait; what counts as "selectable" is the
/// model's business.
pub trait QueryModel {
    /// Look up a selectable physical column by its logical name.
    fn find_column(&self, name: &str) -> Option<PhysicalColumn>;
}
