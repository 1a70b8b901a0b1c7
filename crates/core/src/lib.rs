//! Core types and traits for dumpstream
//!
//! This crate defines the foundational pieces shared by the engine and the
//! binary format:
//! - TableDescriptor: schema metadata captured once per exported table
//! - Row / ResultSet: nullable row tuples paired with their column list
//! - StreamHeader: the one-per-export header frame payload
//! - FilterRegistry: static per-table row-selection overrides
//! - Error: error type hierarchy
//! - Traits: the Connection and DumpSink seams

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use filter::{FilterRegistry, FilterVariant};
pub use traits::{Connection, DumpSink};
pub use types::{Param, ResultSet, Row, StreamHeader, TableDescriptor};
