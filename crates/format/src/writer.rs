//! Framed binary encoding of a dump stream.
//!
//! # Stream Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ File Header (6 bytes)              │  magic "DMPS" + format version u16
//! ├────────────────────────────────────┤
//! │ Stream-header frame                │
//! ├────────────────────────────────────┤
//! │ Table-header frame                 │
//! ├────────────────────────────────────┤
//! │ Row frame                          │
//! ├────────────────────────────────────┤
//! │ ...                                │
//! └────────────────────────────────────┘
//! ```
//!
//! # Frame Layout
//!
//! ```text
//! ┌──────────┬──────────────────┬─────────────────────────┬──────────┐
//! │ Tag (1)  │ Length (4 bytes) │ Payload (variable)      │ CRC32 (4)│
//! └──────────┴──────────────────┴─────────────────────────┴──────────┘
//! ```
//!
//! The CRC32 covers tag, length and payload. All integers are little
//! endian. Strings are a u32 length followed by UTF-8 bytes; nullable
//! values carry a presence byte (0 = SQL NULL) before the string;
//! timestamps are i64 microseconds since the UNIX epoch.
//!
//! The writer is append-only and never seeks: once handed to the
//! underlying sink, bytes are final.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;
use tracing::debug;

use dumpstream_core::{DumpSink, Result, Row, StreamHeader, TableDescriptor};

/// Magic bytes identifying a dump stream: "DMPS"
pub const DUMP_MAGIC: [u8; 4] = *b"DMPS";

/// Current stream format version
pub const DUMP_FORMAT_VERSION: u16 = 1;

/// Frame tag for the stream header
pub const FRAME_STREAM_HEADER: u8 = 0x01;

/// Frame tag for a table header
pub const FRAME_TABLE_HEADER: u8 = 0x02;

/// Frame tag for one row
pub const FRAME_ROW: u8 = 0x03;

/// Serializes dump frames into a forward-only binary stream.
///
/// The file header (magic + format version) is written together with the
/// stream-header frame, so a writer whose export turns out to be a no-op
/// leaves the underlying sink untouched.
pub struct BinaryDumpWriter<W: Write> {
    out: W,
}

impl<W: Write> BinaryDumpWriter<W> {
    /// Create a writer over an output sink.
    pub fn new(out: W) -> Self {
        BinaryDumpWriter { out }
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Recover the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, tag: u8, payload: &[u8]) -> Result<()> {
        let mut prefix = [0u8; 5];
        prefix[0] = tag;
        prefix[1..5].copy_from_slice(&(payload.len() as u32).to_le_bytes());

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&prefix);
        hasher.update(payload);

        self.out.write_all(&prefix)?;
        self.out.write_all(payload)?;
        self.out.write_u32::<LittleEndian>(hasher.finalize())?;
        debug!(tag, bytes = payload.len(), "wrote frame");
        Ok(())
    }
}

impl<W: Write> DumpSink for BinaryDumpWriter<W> {
    fn write_stream_header(&mut self, header: &StreamHeader) -> Result<()> {
        self.out.write_all(&DUMP_MAGIC)?;
        self.out.write_u16::<LittleEndian>(DUMP_FORMAT_VERSION)?;

        let mut payload = Vec::new();
        put_string(&mut payload, &header.server_version)?;
        put_string(&mut payload, &header.database)?;
        payload.write_i64::<LittleEndian>(header.started_at.timestamp_micros())?;
        self.write_frame(FRAME_STREAM_HEADER, &payload)
    }

    fn write_table_header(&mut self, table: &TableDescriptor) -> Result<()> {
        let mut payload = Vec::new();
        put_string(&mut payload, &table.name)?;
        put_string(&mut payload, &table.create_sql)?;
        payload.write_u32::<LittleEndian>(table.columns.len() as u32)?;
        for column in &table.columns {
            put_string(&mut payload, column)?;
        }
        self.write_frame(FRAME_TABLE_HEADER, &payload)
    }

    fn write_row(&mut self, row: &Row) -> Result<()> {
        let mut payload = Vec::new();
        payload.write_u32::<LittleEndian>(row.width() as u32)?;
        for value in row.values() {
            put_nullable(&mut payload, value)?;
        }
        self.write_frame(FRAME_ROW, &payload)
    }
}

fn put_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    buf.write_u32::<LittleEndian>(s.len() as u32)?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn put_nullable(buf: &mut Vec<u8>, value: &Option<String>) -> Result<()> {
    match value {
        Some(s) => {
            buf.write_u8(1)?;
            put_string(buf, s)?;
        }
        None => buf.write_u8(0)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write as _;

    fn sample_header() -> StreamHeader {
        StreamHeader {
            server_version: "8.0.36".to_string(),
            database: "app".to_string(),
            started_at: Utc.timestamp_micros(1_700_000_000_000_000).unwrap(),
        }
    }

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_stream_header_starts_with_magic_and_version() {
        let mut writer = BinaryDumpWriter::new(Vec::new());
        writer.write_stream_header(&sample_header()).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(&bytes[0..4], b"DMPS");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 1);
        assert_eq!(bytes[6], FRAME_STREAM_HEADER);
    }

    #[test]
    fn test_stream_header_payload_layout() {
        let mut writer = BinaryDumpWriter::new(Vec::new());
        writer.write_stream_header(&sample_header()).unwrap();
        let bytes = writer.into_inner();

        // Frame starts after the 6-byte file header.
        let payload_len = u32_at(&bytes, 7) as usize;
        let payload = &bytes[11..11 + payload_len];

        assert_eq!(u32_at(payload, 0), 6); // "8.0.36"
        assert_eq!(&payload[4..10], b"8.0.36");
        assert_eq!(u32_at(payload, 10), 3); // "app"
        assert_eq!(&payload[14..17], b"app");
        let micros = i64::from_le_bytes(payload[17..25].try_into().unwrap());
        assert_eq!(micros, 1_700_000_000_000_000);
        assert_eq!(payload.len(), 25);

        // CRC trailer covers tag + length + payload.
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&bytes[6..11 + payload_len]);
        assert_eq!(u32_at(&bytes, 11 + payload_len), hasher.finalize());
        assert_eq!(bytes.len(), 11 + payload_len + 4);
    }

    #[test]
    fn test_table_header_frame_layout() {
        let table = TableDescriptor::new(
            "users",
            "app",
            "CREATE TABLE users (id INT)",
            vec!["id".to_string(), "name".to_string()],
        );
        let mut writer = BinaryDumpWriter::new(Vec::new());
        writer.write_table_header(&table).unwrap();
        let bytes = writer.into_inner();

        // No file header before a table frame.
        assert_eq!(bytes[0], FRAME_TABLE_HEADER);
        let payload = &bytes[5..5 + u32_at(&bytes, 1) as usize];

        assert_eq!(u32_at(payload, 0), 5);
        assert_eq!(&payload[4..9], b"users");
        let ddl_len = u32_at(payload, 9) as usize;
        let after_ddl = 13 + ddl_len;
        assert_eq!(u32_at(payload, after_ddl), 2); // column count
        assert_eq!(u32_at(payload, after_ddl + 4), 2); // "id"
        assert_eq!(&payload[after_ddl + 8..after_ddl + 10], b"id");
    }

    #[test]
    fn test_row_frame_encodes_nulls_with_presence_byte() {
        let row = Row::new(vec![Some("1".to_string()), None, Some("c".to_string())]);
        let mut writer = BinaryDumpWriter::new(Vec::new());
        writer.write_row(&row).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(bytes[0], FRAME_ROW);
        let payload = &bytes[5..5 + u32_at(&bytes, 1) as usize];

        assert_eq!(u32_at(payload, 0), 3); // value count
        assert_eq!(payload[4], 1); // present
        assert_eq!(u32_at(payload, 5), 1);
        assert_eq!(payload[9], b'1');
        assert_eq!(payload[10], 0); // SQL NULL
        assert_eq!(payload[11], 1); // present
        assert_eq!(u32_at(payload, 12), 1);
        assert_eq!(payload[16], b'c');
        assert_eq!(payload.len(), 17);
    }

    #[test]
    fn test_frames_append_without_seeking() {
        let mut writer = BinaryDumpWriter::new(Vec::new());
        writer.write_stream_header(&sample_header()).unwrap();
        let after_header = writer.out.len();
        writer
            .write_table_header(&TableDescriptor::new(
                "t",
                "app",
                "CREATE TABLE t (id INT)",
                vec!["id".to_string()],
            ))
            .unwrap();
        writer.write_row(&Row::new(vec![Some("1".to_string())])).unwrap();
        let bytes = writer.into_inner();

        // Earlier bytes are untouched by later frames.
        let mut check = BinaryDumpWriter::new(Vec::new());
        check.write_stream_header(&sample_header()).unwrap();
        assert_eq!(&bytes[..after_header], check.into_inner().as_slice());
    }

    #[test]
    fn test_writes_through_to_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.dump");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = BinaryDumpWriter::new(std::io::BufWriter::new(file));

        writer.write_stream_header(&sample_header()).unwrap();
        writer.write_row(&Row::new(vec![None])).unwrap();
        writer.flush().unwrap();
        writer.into_inner().flush().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"DMPS");
        assert!(bytes.len() > 6);
    }
}
