//! In-memory fakes for exercising the engine without a real database.
//!
//! [`ScriptedConnection`] answers the exact query shapes the engine issues
//! (version probe, schema switch, DDL and catalog lookups, paged data
//! scans) from a fixed set of [`FakeTable`]s, and records every statement
//! and page fetch for assertions. [`RecordingSink`] captures emitted frames
//! in order behind a cloneable handle so a paused export can be observed
//! from another thread.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use dumpstream_core::{
    Connection, DumpSink, Error, Param, Result, ResultSet, Row, StreamHeader, TableDescriptor,
};

/// One table served by a [`ScriptedConnection`].
#[derive(Debug, Clone)]
pub struct FakeTable {
    /// Table name
    pub name: String,
    /// Creation DDL echoed by `SHOW CREATE TABLE`
    pub create_sql: String,
    /// Column names, in position order
    pub columns: Vec<String>,
    rows: Vec<Row>,
    filtered: HashMap<String, Vec<Row>>,
}

impl FakeTable {
    /// Create an empty table.
    pub fn new(name: &str, create_sql: &str, columns: &[&str]) -> Self {
        FakeTable {
            name: name.to_string(),
            create_sql: create_sql.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            filtered: HashMap::new(),
        }
    }

    /// Rows returned for an unfiltered scan.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Rows returned when the scan carries exactly this filter clause.
    pub fn with_filtered_rows(mut self, clause: &str, rows: Vec<Row>) -> Self {
        self.filtered.insert(clause.to_string(), rows);
        self
    }

    fn rows_for(&self, clause: &str) -> &[Row] {
        if clause.is_empty() {
            &self.rows
        } else {
            self.filtered.get(clause).map(Vec::as_slice).unwrap_or(&[])
        }
    }
}

/// Build a row from optional string slices.
pub fn row(values: &[Option<&str>]) -> Row {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

/// An in-memory [`Connection`] scripted from fake tables.
pub struct ScriptedConnection {
    server_version: String,
    database: String,
    tables: Vec<FakeTable>,
    echo_overrides: HashMap<String, String>,
    fail_matching: Option<String>,
    statements: Mutex<Vec<String>>,
    fetches: Mutex<Vec<(String, u64)>>,
}

impl ScriptedConnection {
    /// Create a connection to `database` on a server reporting
    /// `server_version`.
    pub fn new(server_version: &str, database: &str) -> Self {
        ScriptedConnection {
            server_version: server_version.to_string(),
            database: database.to_string(),
            tables: Vec::new(),
            echo_overrides: HashMap::new(),
            fail_matching: None,
            statements: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Serve `table` from this connection.
    pub fn add_table(&mut self, table: FakeTable) {
        self.tables.push(table);
    }

    /// Make `SHOW CREATE TABLE` for `table` echo a different name, as a
    /// misbehaving driver would.
    pub fn echo_create_table_name(&mut self, table: &str, echoed: &str) {
        self.echo_overrides
            .insert(table.to_string(), echoed.to_string());
    }

    /// Fail any query or statement whose SQL contains `needle`.
    pub fn fail_queries_containing(&mut self, needle: &str) {
        self.fail_matching = Some(needle.to_string());
    }

    /// Every statement executed via [`Connection::execute`], in order.
    pub fn executed_statements(&self) -> Vec<String> {
        self.statements.lock().clone()
    }

    /// Every data-page fetch issued so far, as (table, offset) pairs in
    /// order. Unchunked scans record offset zero.
    pub fn page_fetches(&self) -> Vec<(String, u64)> {
        self.fetches.lock().clone()
    }

    fn check_failure(&self, sql: &str) -> Result<()> {
        if let Some(needle) = &self.fail_matching {
            if sql.contains(needle.as_str()) {
                return Err(Error::Connection(format!("scripted failure for {sql:?}")));
            }
        }
        Ok(())
    }

    fn table(&self, name: &str) -> Result<&FakeTable> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::Connection(format!("unknown table {name}")))
    }

    fn data_scan(&self, sql: &str, params: &[Param]) -> Result<ResultSet> {
        let mut target = sql.strip_prefix("SELECT * FROM ").unwrap_or_default();

        let mut bounds = None;
        if let Some(stripped) = target.strip_suffix(" LIMIT ? OFFSET ?") {
            target = stripped;
            match params {
                [Param::UInt(limit), Param::UInt(offset)] => bounds = Some((*limit, *offset)),
                other => {
                    return Err(Error::Connection(format!(
                        "bad LIMIT/OFFSET parameters: {other:?}"
                    )))
                }
            }
        }

        let (name, clause) = match target.find(' ') {
            Some(at) => target.split_at(at),
            None => (target, ""),
        };
        let table = self.table(name)?;
        let rows = table.rows_for(clause);

        let page = match bounds {
            Some((limit, offset)) => {
                self.fetches.lock().push((name.to_string(), offset));
                let start = (offset as usize).min(rows.len());
                let end = (start + limit as usize).min(rows.len());
                rows[start..end].to_vec()
            }
            None => {
                self.fetches.lock().push((name.to_string(), 0));
                rows.to_vec()
            }
        };

        Ok(ResultSet::from_rows(table.columns.clone(), page))
    }

    fn catalog_columns(&self, params: &[Param]) -> Result<ResultSet> {
        let (table, schema) = match params {
            [Param::Str(table), Param::Str(schema)] => (table.as_str(), schema.as_str()),
            other => {
                return Err(Error::Connection(format!(
                    "bad catalog parameters: {other:?}"
                )))
            }
        };

        let mut names = Vec::new();
        if schema == self.database {
            if let Ok(t) = self.table(table) {
                names = t
                    .columns
                    .iter()
                    .map(|c| row(&[Some(c.as_str())]))
                    .collect();
            }
        }
        Ok(ResultSet::from_rows(vec!["COLUMN_NAME".to_string()], names))
    }
}

impl Connection for ScriptedConnection {
    fn execute(&self, sql: &str, _params: &[Param]) -> Result<()> {
        self.check_failure(sql)?;
        self.statements.lock().push(sql.to_string());
        Ok(())
    }

    fn query(&self, sql: &str, params: &[Param]) -> Result<ResultSet> {
        self.check_failure(sql)?;

        if sql.starts_with("SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS") {
            return self.catalog_columns(params);
        }
        if sql == "SHOW TABLES" {
            let names: Vec<Row> = self
                .tables
                .iter()
                .map(|t| row(&[Some(t.name.as_str())]))
                .collect();
            return Ok(ResultSet::from_rows(
                vec!["Tables_in_db".to_string()],
                names,
            ));
        }
        if sql.starts_with("SELECT * FROM ") {
            return self.data_scan(sql, params);
        }

        Err(Error::Connection(format!("unscripted query: {sql}")))
    }

    fn query_row(&self, sql: &str, _params: &[Param]) -> Result<Option<Row>> {
        self.check_failure(sql)?;

        if sql == "SELECT version()" {
            return Ok(Some(row(&[Some(self.server_version.as_str())])));
        }
        if let Some(name) = sql.strip_prefix("SHOW CREATE TABLE ") {
            let table = self.table(name)?;
            let echoed = self
                .echo_overrides
                .get(name)
                .map(String::as_str)
                .unwrap_or(&table.name);
            return Ok(Some(row(&[Some(echoed), Some(table.create_sql.as_str())])));
        }

        Err(Error::Connection(format!("unscripted query: {sql}")))
    }
}

/// One frame captured by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Stream-header frame
    Stream(StreamHeader),
    /// Table-header frame
    Table(TableDescriptor),
    /// Row-batch frame
    Row(Row),
}

/// A [`DumpSink`] that records frames in emission order.
///
/// Clones share the same frame log, so a test can keep one handle while
/// the dumper owns another.
#[derive(Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        RecordingSink::default()
    }

    /// All frames captured so far, in order.
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    /// Number of frames captured so far.
    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Names from the table-header frames, in order.
    pub fn table_headers(&self) -> Vec<String> {
        self.frames
            .lock()
            .iter()
            .filter_map(|f| match f {
                Frame::Table(t) => Some(t.name.clone()),
                _ => None,
            })
            .collect()
    }

    /// All row frames, in order.
    pub fn rows(&self) -> Vec<Row> {
        self.frames
            .lock()
            .iter()
            .filter_map(|f| match f {
                Frame::Row(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }
}

impl DumpSink for RecordingSink {
    fn write_stream_header(&mut self, header: &StreamHeader) -> Result<()> {
        self.frames.lock().push(Frame::Stream(header.clone()));
        Ok(())
    }

    fn write_table_header(&mut self, table: &TableDescriptor) -> Result<()> {
        self.frames.lock().push(Frame::Table(table.clone()));
        Ok(())
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        self.frames.lock().push(Frame::Row(row.clone()));
        Ok(())
    }
}
