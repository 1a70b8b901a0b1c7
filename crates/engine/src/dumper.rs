//! The dump orchestration loop.
//!
//! Stream order is the core invariant: one stream-header frame first, then
//! for each requested table (in caller order) one table-header frame
//! followed by that table's rows. Rows for a table are produced by running
//! every registered filter variant in listed order, each paginated
//! independently. The pause gate is consulted before each page fetch, never
//! mid-frame.
//!
//! Failure at any table aborts the whole export, wrapped with the table
//! name. Frames already handed to the sink stay there: the format is
//! forward-only and supports no rollback of flushed bytes.

use chrono::Utc;
use tracing::{debug, info};

use dumpstream_core::{
    Connection, DumpSink, Error, FilterRegistry, Result, Row, StreamHeader, TableDescriptor,
};

use crate::cursor::PageCursor;
use crate::pause::PauseGate;
use crate::schema;

/// Exports the schema and contents of selected tables into a [`DumpSink`].
pub struct Dumper<C, S> {
    conn: C,
    sink: S,
    chunk_size: u64,
    filters: FilterRegistry,
    gate: PauseGate,
}

impl<C: Connection, S: DumpSink> Dumper<C, S> {
    /// Create a dumper over a connection and sink.
    ///
    /// `chunk_size` bounds each page fetch; zero retrieves every filtered
    /// scan in one unbounded query (and therefore also bounds pause
    /// granularity: an unchunked scan cannot be paused mid-flight).
    pub fn new(conn: C, sink: S, chunk_size: u64) -> Self {
        Dumper {
            conn,
            sink,
            chunk_size,
            filters: FilterRegistry::new(),
            gate: PauseGate::new(),
        }
    }

    /// Install per-table row-filter overrides.
    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    /// Share an externally-owned pause gate with this dumper.
    pub fn with_gate(mut self, gate: PauseGate) -> Self {
        self.gate = gate;
        self
    }

    /// A handle to the pause gate consulted between page fetches.
    pub fn gate(&self) -> PauseGate {
        self.gate.clone()
    }

    /// Tear the dumper down, recovering the connection and sink.
    pub fn into_parts(self) -> (C, S) {
        (self.conn, self.sink)
    }

    /// Dump the given tables, in order.
    ///
    /// An empty table list is a no-op success: no frame is emitted, the
    /// server is not contacted. If `database` is non-empty the active
    /// schema is switched to it before any table work.
    pub fn dump<T: AsRef<str>>(&mut self, database: &str, tables: &[T]) -> Result<()> {
        if tables.is_empty() {
            return Ok(());
        }

        let server_version = self.server_version()?;
        self.switch_database(database)?;

        self.sink.write_stream_header(&StreamHeader {
            server_version,
            database: database.to_string(),
            started_at: Utc::now(),
        })?;

        for table in tables {
            let table = table.as_ref();
            self.dump_table(table, database)
                .map_err(|e| e.in_table(table))?;
        }

        Ok(())
    }

    /// Dump every table in `database`, as listed by the server.
    pub fn dump_all_tables(&mut self, database: &str) -> Result<()> {
        self.switch_database(database)?;
        let tables = self.list_tables()?;
        self.dump(database, &tables)
    }

    fn dump_table(&mut self, table: &str, database: &str) -> Result<()> {
        let descriptor = schema::describe(&self.conn, table, database)?;
        self.sink.write_table_header(&descriptor)?;
        info!(table, columns = descriptor.column_count(), "captured table schema");

        let Dumper {
            conn,
            sink,
            chunk_size,
            filters,
            gate,
        } = self;

        for filter in filters.variants_for(database, table) {
            let mut cursor = PageCursor::new(*chunk_size);
            loop {
                gate.wait_until_open();

                let (sql, params) = cursor.page_query(table, filter);
                debug!(table, offset = cursor.offset(), %sql, "fetching rows");
                let result = conn.query(&sql, &params)?;
                check_width(table, &descriptor, result.column_count())?;

                let mut rows_seen = 0u64;
                for row in result {
                    let row = row?;
                    check_width(table, &descriptor, row.width())?;
                    sink.write_row(&row)?;
                    rows_seen += 1;
                }
                debug!(table, rows = rows_seen, "page complete");

                if !cursor.advance(rows_seen) {
                    break;
                }
            }
        }

        Ok(())
    }

    fn server_version(&self) -> Result<String> {
        let row = self
            .conn
            .query_row("SELECT version()", &[])?
            .ok_or_else(|| Error::Connection("server version query returned no row".into()))?;
        Ok(row.first_value().unwrap_or_default().to_string())
    }

    fn switch_database(&self, database: &str) -> Result<()> {
        if !database.is_empty() {
            self.conn.execute(&format!("USE `{database}`"), &[])?;
        }
        Ok(())
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        let result = self.conn.query("SHOW TABLES", &[])?;
        let mut tables = Vec::new();
        for row in result {
            let row: Row = row?;
            tables.push(row.first_value().unwrap_or_default().to_string());
        }
        Ok(tables)
    }
}

fn check_width(table: &str, descriptor: &TableDescriptor, actual: usize) -> Result<()> {
    if actual != descriptor.column_count() {
        return Err(Error::RowWidthMismatch {
            table: table.to_string(),
            expected: descriptor.column_count(),
            actual,
        });
    }
    Ok(())
}
