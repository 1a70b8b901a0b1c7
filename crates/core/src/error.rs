//! Error types for dumpstream
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! All hard failures unwind immediately to the caller of the top-level dump
//! operation; there is no per-table or per-chunk retry. An empty requested
//! table list is not an error: the export completes with zero frames.

use std::io;
use thiserror::Error;

/// Result type alias for dumpstream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the dump engine and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// Failure executing or reading from the database connection.
    /// Always fatal to the whole export, never retried internally.
    #[error("connection error: {0}")]
    Connection(String),

    /// The creation-DDL query echoed a different table name than requested.
    /// Signals a caller/driver inconsistency.
    #[error("schema mismatch: requested table {requested:?}, server reported {reported:?}")]
    SchemaMismatch {
        /// Table name the schema reader asked for
        requested: String,
        /// Table name the server echoed back
        reported: String,
    },

    /// A table reported zero columns. Such a table cannot be represented
    /// in the dump stream.
    #[error("no columns in table {0}")]
    NoColumns(String),

    /// A row tuple's value count diverged from the table's column count.
    /// The engine fails here rather than write positionally misaligned data.
    #[error("row width mismatch in table {table}: expected {expected} values, got {actual}")]
    RowWidthMismatch {
        /// Table being exported
        table: String,
        /// Column count from the table descriptor
        expected: usize,
        /// Value count actually observed
        actual: usize,
    },

    /// I/O error writing to the output sink
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure during one table's export, tagged with the table name.
    /// Frames already flushed for earlier tables (and for this table, up to
    /// the failure point) remain in the output stream.
    #[error("table {table}: {source}")]
    Table {
        /// Table whose export failed
        table: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the name of the table being exported when it occurred.
    pub fn in_table(self, table: impl Into<String>) -> Self {
        Error::Table {
            table: table.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = Error::Connection("server has gone away".to_string());
        let msg = err.to_string();
        assert!(msg.contains("connection error"));
        assert!(msg.contains("server has gone away"));
    }

    #[test]
    fn test_error_display_schema_mismatch() {
        let err = Error::SchemaMismatch {
            requested: "users".to_string(),
            reported: "user".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("schema mismatch"));
        assert!(msg.contains("users"));
    }

    #[test]
    fn test_error_display_no_columns() {
        let err = Error::NoColumns("empty_table".to_string());
        assert!(err.to_string().contains("no columns in table empty_table"));
    }

    #[test]
    fn test_error_display_row_width_mismatch() {
        let err = Error::RowWidthMismatch {
            table: "users".to_string(),
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 3"));
        assert!(msg.contains("got 2"));
    }

    #[test]
    fn test_error_in_table_wraps_source() {
        let err = Error::Connection("timeout".to_string()).in_table("event_log");
        let msg = err.to_string();
        assert!(msg.contains("table event_log"));
        assert!(msg.contains("timeout"));

        match err {
            Error::Table { table, source } => {
                assert_eq!(table, "event_log");
                assert!(matches!(*source, Error::Connection(_)));
            }
            other => panic!("expected Table wrapper, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }
}
