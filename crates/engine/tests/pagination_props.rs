//! Property tests for the pagination loop.

use proptest::prelude::*;

use dumpstream_engine::testing::{row, FakeTable, RecordingSink, ScriptedConnection};
use dumpstream_engine::Dumper;

fn connection_with_rows(count: u64) -> ScriptedConnection {
    let rows = (0..count)
        .map(|i| row(&[Some(i.to_string().as_str())]))
        .collect();
    let mut conn = ScriptedConnection::new("8.0.36", "app");
    conn.add_table(FakeTable::new("data", "CREATE TABLE data (id INT)", &["id"]).with_rows(rows));
    conn
}

proptest! {
    /// With chunk size C > 0 and R rows, the loop always issues
    /// floor(R / C) + 1 fetches: every full or partial page is followed by
    /// one more fetch, and only an empty fetch terminates the scan.
    #[test]
    fn chunked_fetch_count_is_rows_div_chunk_plus_one(
        rows in 0u64..50,
        chunk in 1u64..8,
    ) {
        let conn = connection_with_rows(rows);
        let sink = RecordingSink::new();
        let mut dumper = Dumper::new(&conn, sink.clone(), chunk);
        dumper.dump("app", &["data"]).unwrap();

        prop_assert_eq!(conn.page_fetches().len() as u64, rows / chunk + 1);
        prop_assert_eq!(sink.rows().len() as u64, rows);

        // Offsets advance by exactly the chunk size.
        for (i, (_, offset)) in conn.page_fetches().iter().enumerate() {
            prop_assert_eq!(*offset, i as u64 * chunk);
        }
    }

    /// An unchunked scan issues exactly one fetch no matter the row count.
    #[test]
    fn unchunked_scan_is_a_single_fetch(rows in 0u64..50) {
        let conn = connection_with_rows(rows);
        let sink = RecordingSink::new();
        let mut dumper = Dumper::new(&conn, sink.clone(), 0);
        dumper.dump("app", &["data"]).unwrap();

        prop_assert_eq!(conn.page_fetches().len(), 1);
        prop_assert_eq!(sink.rows().len() as u64, rows);
    }
}
