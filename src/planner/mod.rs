//! Join path planning.
//!
//! A [`JoinGraph`] models the joinable tables of one data model as a
//! directed graph rooted at the primary ("fact") table. Given a set of
//! requested target tables, [`JoinGraph::get_path`] returns the minimal
//! edge set connecting the root to all of them, ordered so every join's
//! ON-condition only references tables already introduced.

mod graph;
mod join;

pub use graph::JoinGraph;
pub use join::{JoinEdge, JoinOn, JoinType, OnConditionBuilder, QueryTable};
