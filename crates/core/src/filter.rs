//! Per-table row-filter overrides.
//!
//! The registry is a configuration table, not runtime logic: it is built
//! once at startup (programmatically or deserialized from a config
//! document) and queried read-only by the dump engine. Keyed by
//! (database, table), each entry lists the filter variants to run for that
//! table:
//!
//! - unregistered table: one unfiltered pass over all rows
//! - registered with an empty list: schema only, no rows
//! - registered with N variants: N independent passes, in listed order
//!
//! Splitting a table across variants lets an export partition its rows into
//! disjoint, order-preserving query shapes, e.g. old rows under one
//! predicate and new rows under another.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One SQL clause fragment appended verbatim to `SELECT * FROM <table>`.
///
/// Non-empty variants must carry their own leading whitespace, e.g.
/// `" WHERE id >= 1000"`. The empty variant selects all rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterVariant(String);

// Returned by `variants_for` for tables with no registered override.
static UNFILTERED: FilterVariant = FilterVariant(String::new());

impl FilterVariant {
    /// Create a variant from a clause fragment.
    pub fn new(clause: impl Into<String>) -> Self {
        FilterVariant(clause.into())
    }

    /// The variant that selects all rows.
    pub fn unfiltered() -> Self {
        FilterVariant(String::new())
    }

    /// True if this variant applies no predicate.
    pub fn is_unfiltered(&self) -> bool {
        self.0.is_empty()
    }

    /// The clause fragment, exactly as it is appended to the query.
    pub fn as_sql(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FilterVariant {
    fn from(clause: &str) -> Self {
        FilterVariant(clause.to_string())
    }
}

/// Immutable lookup from (database, table) to the filter variants to run
/// for that table's data export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterRegistry {
    databases: HashMap<String, HashMap<String, Vec<FilterVariant>>>,
}

impl FilterRegistry {
    /// Create an empty registry: every table exports unfiltered.
    pub fn new() -> Self {
        FilterRegistry::default()
    }

    /// Register the filter variants for a table. An empty `variants` list
    /// means "export schema only, skip all rows".
    pub fn insert(
        &mut self,
        database: impl Into<String>,
        table: impl Into<String>,
        variants: Vec<FilterVariant>,
    ) {
        self.databases
            .entry(database.into())
            .or_default()
            .insert(table.into(), variants);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        database: impl Into<String>,
        table: impl Into<String>,
        variants: Vec<FilterVariant>,
    ) -> Self {
        self.insert(database, table, variants);
        self
    }

    /// Register a table whose rows are skipped entirely.
    pub fn skip_all(&mut self, database: impl Into<String>, table: impl Into<String>) {
        self.insert(database, table, Vec::new());
    }

    /// The filter variants to run for a table, in order.
    ///
    /// Unregistered tables get a single unfiltered variant; registered
    /// tables get exactly their listed variants, which may be none.
    pub fn variants_for(&self, database: &str, table: &str) -> &[FilterVariant] {
        match self
            .databases
            .get(database)
            .and_then(|tables| tables.get(table))
        {
            Some(variants) => variants,
            None => std::slice::from_ref(&UNFILTERED),
        }
    }

    /// True if no table has a registered override.
    pub fn is_empty(&self) -> bool {
        self.databases.values().all(|tables| tables.is_empty())
    }
}
