//! SQL backend: fragments of SQL text with bound parameters.

mod dialect;
mod factory;
mod fragment;

pub use dialect::Dialect;
pub use factory::SqlFactory;
pub use fragment::SqlFragment;
