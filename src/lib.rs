//! dumpstream - framed binary exports of relational tables
//!
//! dumpstream walks a set of tables, captures each table's creation DDL and
//! column list, and streams its rows in bounded chunks toward a framed
//! binary sink. Per-table filter overrides can split or skip a table's
//! rows, and a shared pause gate lets a coordinator suspend the export
//! between page fetches without corrupting the stream.
//!
//! # Quick Start
//!
//! ```
//! use dumpstream::testing::{row, FakeTable, ScriptedConnection};
//! use dumpstream::{BinaryDumpWriter, Dumper};
//!
//! // Any type implementing `Connection` works; the scripted fake stands in
//! // for a real driver here.
//! let mut conn = ScriptedConnection::new("8.0.36", "app");
//! conn.add_table(
//!     FakeTable::new("users", "CREATE TABLE users (id INT)", &["id"])
//!         .with_rows(vec![row(&[Some("1")]), row(&[Some("2")])]),
//! );
//!
//! let writer = BinaryDumpWriter::new(Vec::new());
//! let mut dumper = Dumper::new(conn, writer, 500);
//! dumper.dump("app", &["users"]).unwrap();
//!
//! let (_conn, writer) = dumper.into_parts();
//! let bytes = writer.into_inner();
//! assert_eq!(&bytes[0..4], b"DMPS");
//! ```
//!
//! # Architecture
//!
//! The engine is the only stateful piece: it owns the pagination cursor and
//! drives the three-stage framing protocol (stream header, table header,
//! rows) toward the sink. The connection and the sink are trait seams, so
//! the whole export path can run against in-memory fakes.

pub use dumpstream_core::{
    Connection, DumpSink, Error, FilterRegistry, FilterVariant, Param, Result, ResultSet, Row,
    StreamHeader, TableDescriptor,
};
pub use dumpstream_engine::{describe, Dumper, PageCursor, PauseGate};
pub use dumpstream_format::{
    BinaryDumpWriter, DUMP_FORMAT_VERSION, DUMP_MAGIC, FRAME_ROW, FRAME_STREAM_HEADER,
    FRAME_TABLE_HEADER,
};

/// In-memory connection and sink fakes, re-exported for downstream tests.
pub use dumpstream_engine::testing;
