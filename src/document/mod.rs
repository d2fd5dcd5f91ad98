//! Document backend: aggregation-pipeline expression trees.

mod factory;
mod fragment;

pub use factory::DocumentFactory;
pub use fragment::DocumentFragment;
