//! Value types shared by the dump engine and the binary format.
//!
//! The central invariant here is positional alignment: every [`Row`] written
//! for a table must carry exactly one value per entry in that table's
//! column-name sequence, in column order. [`ResultSet`] keeps the column
//! list and the row stream together as one value so the alignment travels
//! with the data instead of living in two independently indexed containers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Schema metadata captured once per exported table.
///
/// Built at the start of a table's export, immutable thereafter. The column
/// order is the column position in the table and must match the value order
/// of every row tuple emitted for the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: String,
    /// Owning schema (database) name
    pub schema: String,
    /// Creation DDL as reported by the server
    pub create_sql: String,
    /// Column names in column-position order
    pub columns: Vec<String>,
}

impl TableDescriptor {
    /// Create a new descriptor.
    pub fn new(
        name: impl Into<String>,
        schema: impl Into<String>,
        create_sql: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        TableDescriptor {
            name: name.into(),
            schema: schema.into(),
            create_sql: create_sql.into(),
            columns,
        }
    }

    /// Number of columns in the table.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// One row tuple: ordered nullable string values, positionally aligned with
/// a [`TableDescriptor`]'s column names. `None` represents SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row(Vec<Option<String>>);

impl Row {
    /// Create a row from its values.
    pub fn new(values: Vec<Option<String>>) -> Self {
        Row(values)
    }

    /// The row's values, in column order.
    pub fn values(&self) -> &[Option<String>] {
        &self.0
    }

    /// Number of values in the tuple.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// First value of the row, flattened. Convenience for single-column
    /// results such as `SHOW TABLES`.
    pub fn first_value(&self) -> Option<&str> {
        self.0.first().and_then(|v| v.as_deref())
    }
}

impl From<Vec<Option<String>>> for Row {
    fn from(values: Vec<Option<String>>) -> Self {
        Row(values)
    }
}

impl FromIterator<Option<String>> for Row {
    fn from_iter<I: IntoIterator<Item = Option<String>>>(iter: I) -> Self {
        Row(iter.into_iter().collect())
    }
}

/// Payload of the one-per-export stream-header frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamHeader {
    /// Server version string, e.g. `8.0.36`
    pub server_version: String,
    /// Database the export was taken from (may be empty)
    pub database: String,
    /// Export start time, UTC
    pub started_at: DateTime<Utc>,
}

/// A positional query parameter.
///
/// Used for LIMIT/OFFSET in page queries and for the exact-match filters on
/// the metadata catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// String parameter
    Str(String),
    /// Unsigned integer parameter
    UInt(u64),
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Str(s.to_string())
    }
}

impl From<u64> for Param {
    fn from(n: u64) -> Self {
        Param::UInt(n)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Str(s) => write!(f, "{s}"),
            Param::UInt(n) => write!(f, "{n}"),
        }
    }
}

/// The result of a row-returning query: a column-name list paired with a
/// fallible stream of rows aligned to it.
///
/// Rows are pulled one at a time; a connection implementation is free to
/// stream them from the wire rather than buffer the whole result.
pub struct ResultSet {
    columns: Vec<String>,
    rows: Box<dyn Iterator<Item = Result<Row>> + Send>,
}

impl ResultSet {
    /// Create a result set over an arbitrary row iterator.
    pub fn new<I>(columns: Vec<String>, rows: I) -> Self
    where
        I: Iterator<Item = Result<Row>> + Send + 'static,
    {
        ResultSet {
            columns,
            rows: Box::new(rows),
        }
    }

    /// Create a result set from already-materialized rows. Intended for
    /// in-memory connection implementations and tests.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        ResultSet {
            columns,
            rows: Box::new(rows.into_iter().map(Ok)),
        }
    }

    /// Column names, in column-position order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

impl Iterator for ResultSet {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}
