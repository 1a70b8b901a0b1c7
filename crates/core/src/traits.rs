//! The two seams of the system: the database connection the engine reads
//! from, and the sink the framed dump is written to.
//!
//! Both are object-safe so the engine can be exercised against in-memory
//! implementations without a real database or on-disk file.

use crate::error::Result;
use crate::types::{Param, ResultSet, Row, StreamHeader, TableDescriptor};

/// A live database handle capable of executing queries and returning rows.
///
/// The engine uses the connection read-only: the only statement it executes
/// is the schema switch. Connection pooling, retry and backoff are the
/// provider's concern, not the engine's.
pub trait Connection: Send + Sync {
    /// Execute a statement with no result set (e.g. `USE` for a schema
    /// switch).
    fn execute(&self, sql: &str, params: &[Param]) -> Result<()>;

    /// Run a query returning zero or more rows plus a column-name list.
    /// Positional `?` placeholders are bound from `params` in order.
    fn query(&self, sql: &str, params: &[Param]) -> Result<ResultSet>;

    /// Run a query expected to return at most one row (server version,
    /// per-table DDL).
    fn query_row(&self, sql: &str, params: &[Param]) -> Result<Option<Row>>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn execute(&self, sql: &str, params: &[Param]) -> Result<()> {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &[Param]) -> Result<ResultSet> {
        (**self).query(sql, params)
    }

    fn query_row(&self, sql: &str, params: &[Param]) -> Result<Option<Row>> {
        (**self).query_row(sql, params)
    }
}

/// The downstream writer the engine emits frames to.
///
/// Calls arrive strictly in stream order: one stream header first, then for
/// each table one table header followed by that table's rows. The stream is
/// append-only and forward-only; no frame is ever rewritten. Implementations
/// own the actual byte encoding, compression or transport.
pub trait DumpSink {
    /// Write the one-per-export stream header. Called exactly once, first.
    fn write_stream_header(&mut self, header: &StreamHeader) -> Result<()>;

    /// Write a table header. Called once per exported table, before any of
    /// its rows.
    fn write_table_header(&mut self, table: &TableDescriptor) -> Result<()>;

    /// Write one row, positionally aligned to the preceding table header's
    /// column list. `None` entries represent SQL NULL.
    fn write_row(&mut self, row: &Row) -> Result<()>;
}

impl<S: DumpSink + ?Sized> DumpSink for &mut S {
    fn write_stream_header(&mut self, header: &StreamHeader) -> Result<()> {
        (**self).write_stream_header(header)
    }

    fn write_table_header(&mut self, table: &TableDescriptor) -> Result<()> {
        (**self).write_table_header(table)
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        (**self).write_row(row)
    }
}
