//! Model types: columns, calculated fields, and the query model seam.

pub mod column;
pub mod field;
pub mod types;

pub use column::{ColumnRef, PhysicalColumn, QueryModel};
pub use field::{CalculatedColumn, CalculatedFieldDef, CompiledExpr};
pub use types::{Aggregation, ColumnType};
