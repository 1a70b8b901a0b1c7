//! Binary stream format for dumpstream
//!
//! A concrete [`DumpSink`](dumpstream_core::DumpSink) that serializes dump
//! frames into a single forward-only byte stream over any
//! [`std::io::Write`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod writer;

pub use writer::{
    BinaryDumpWriter, DUMP_FORMAT_VERSION, DUMP_MAGIC, FRAME_ROW, FRAME_STREAM_HEADER,
    FRAME_TABLE_HEADER,
};
