//! Dump engine for dumpstream
//!
//! This crate drives a point-in-time, chunked export of selected tables
//! toward a [`DumpSink`](dumpstream_core::DumpSink):
//!
//! - schema: table-creation DDL and ordered column lists
//! - cursor: LIMIT/OFFSET pagination for one (table, filter variant) pair
//! - pause: the cooperative gate consulted between page fetches
//! - dumper: the orchestration loop tying the above together
//! - testing: in-memory connection and sink fakes
//!
//! A single worker drives the whole export; at most one table, one filter
//! variant and one page fetch are in flight at a time.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod dumper;
pub mod pause;
pub mod schema;
pub mod testing;

pub use cursor::PageCursor;
pub use dumper::Dumper;
pub use pause::PauseGate;
pub use schema::describe;
