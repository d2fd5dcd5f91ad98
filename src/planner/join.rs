//! Join graph nodes and edges.

use std::sync::Arc;

/// Builds a backend-native ON-condition from the two side aliases.
///
/// Supplied by model configuration for joins that a plain foreign key
/// cannot express; invoked by the downstream query assembler.
pub type OnConditionBuilder = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// One joinable table or collection.
///
/// Identity is the alias: two tables with the same alias are the same
/// node, whatever their physical names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTable {
    /// Physical table or collection name.
    pub name: String,
    /// Stable alias used in generated queries (e.g., "t0").
    pub alias: String,
}

impl QueryTable {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            alias: alias.into(),
        })
    }
}

impl std::fmt::Display for QueryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.alias)
    }
}

/// Join kind, defaulting to LEFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Left,
    Inner,
    Right,
}

impl JoinType {
    /// SQL keyword for this join kind.
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Left => "LEFT JOIN",
            JoinType::Inner => "INNER JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Source of an edge's ON-condition.
///
/// Exactly one of the two: a foreign key column on the `from` side, or
/// a dynamic builder for joins a single column cannot express.
#[derive(Clone)]
pub enum JoinOn {
    /// Foreign key column on the `from` table, matched against the
    /// `to` table's primary key.
    ForeignKey(String),
    /// Opaque condition builder invoked at assembly time.
    Builder(OnConditionBuilder),
}

impl JoinOn {
    pub fn foreign_key(column: impl Into<String>) -> Self {
        JoinOn::ForeignKey(column.into())
    }

    pub fn builder<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        JoinOn::Builder(Arc::new(f))
    }
}

impl std::fmt::Debug for JoinOn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinOn::ForeignKey(k) => f.debug_tuple("ForeignKey").field(k).finish(),
            JoinOn::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

impl PartialEq for JoinOn {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JoinOn::ForeignKey(a), JoinOn::ForeignKey(b)) => a == b,
            // Builders are opaque; equal only when literally shared.
            (JoinOn::Builder(a), JoinOn::Builder(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A directed join from one table to another.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinEdge {
    pub from: Arc<QueryTable>,
    pub to: Arc<QueryTable>,
    pub on: JoinOn,
    pub join_type: JoinType,
}

impl std::fmt::Display for JoinEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({})", self.from.alias, self.to.alias, self.join_type)
    }
}
