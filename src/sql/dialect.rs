//! Target-database function remapping.
//!
//! The expression grammar uses one function vocabulary (MySQL-flavored);
//! dialects translate names the target database spells differently.
//! Only names, not argument shapes: a function whose arguments need
//! restructuring for some target does not belong in the allow-list.

use serde::{Deserialize, Serialize};

/// SQL dialect the fragment is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// No remapping; emit the allow-list vocabulary as-is.
    #[default]
    Generic,
    MySql,
    Postgres,
}

impl Dialect {
    /// Dialect name for display and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
        }
    }

    /// Remap a function name for this dialect.
    ///
    /// `name` must already be uppercased. Names the dialect spells the
    /// same way pass through unchanged.
    pub fn remap_function<'a>(&self, name: &'a str) -> &'a str {
        match self {
            // The grammar's vocabulary is MySQL's, so both pass through.
            Dialect::Generic | Dialect::MySql => name,
            Dialect::Postgres => match name {
                "IFNULL" | "NVL" => "COALESCE",
                "INSTR" => "STRPOS",
                "TRUNCATE" => "TRUNC",
                _ => name,
            },
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
