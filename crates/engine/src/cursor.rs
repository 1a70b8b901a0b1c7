//! Pagination cursor for one (table, filter variant) pair.
//!
//! A chunk size of zero disables chunking: the cursor builds one unbounded
//! query and terminates after a single fetch regardless of row count. With
//! chunking enabled the offset advances by the chunk size after every
//! non-empty fetch, and the loop terminates on the first fetch that yields
//! zero rows. Termination is decided by the observed row count, never by
//! comparing it to the chunk size: a fetch returning an exactly full page
//! always triggers one more fetch.

use dumpstream_core::{FilterVariant, Param};

/// Offset/chunk state for paging through one filtered table scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    chunk_size: u64,
    offset: u64,
}

impl PageCursor {
    /// Create a cursor at offset zero. `chunk_size == 0` disables chunking.
    pub fn new(chunk_size: u64) -> Self {
        PageCursor {
            chunk_size,
            offset: 0,
        }
    }

    /// True when the cursor pages with LIMIT/OFFSET.
    pub fn chunked(&self) -> bool {
        self.chunk_size > 0
    }

    /// Current fetch offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Build the page query for `table` under `filter`.
    ///
    /// The filter clause is appended verbatim. When chunked, the query
    /// carries `LIMIT ? OFFSET ?` with the bounds as positional parameters.
    pub fn page_query(&self, table: &str, filter: &FilterVariant) -> (String, Vec<Param>) {
        let base = format!("SELECT * FROM {}{}", table, filter.as_sql());
        if self.chunked() {
            (
                format!("{base} LIMIT ? OFFSET ?"),
                vec![Param::UInt(self.chunk_size), Param::UInt(self.offset)],
            )
        } else {
            (base, Vec::new())
        }
    }

    /// Record the outcome of a fetch. Returns true when another fetch
    /// should be issued, advancing the offset by the chunk size.
    pub fn advance(&mut self, rows_seen: u64) -> bool {
        if !self.chunked() || rows_seen == 0 {
            return false;
        }
        self.offset += self.chunk_size;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchunked_cursor_fetches_exactly_once() {
        let mut cursor = PageCursor::new(0);
        assert!(!cursor.chunked());
        let (sql, params) = cursor.page_query("users", &FilterVariant::unfiltered());
        assert_eq!(sql, "SELECT * FROM users");
        assert!(params.is_empty());
        // Even a full result set does not continue an unchunked scan.
        assert!(!cursor.advance(10_000));
    }

    #[test]
    fn test_chunked_query_carries_limit_and_offset_params() {
        let cursor = PageCursor::new(500);
        let (sql, params) = cursor.page_query("users", &FilterVariant::unfiltered());
        assert_eq!(sql, "SELECT * FROM users LIMIT ? OFFSET ?");
        assert_eq!(params, vec![Param::UInt(500), Param::UInt(0)]);
    }

    #[test]
    fn test_filter_clause_is_appended_verbatim() {
        let cursor = PageCursor::new(0);
        let filter = FilterVariant::from(" WHERE id >= 517837446");
        let (sql, _) = cursor.page_query("event_log", &filter);
        assert_eq!(sql, "SELECT * FROM event_log WHERE id >= 517837446");
    }

    #[test]
    fn test_offset_advances_by_chunk_size_on_nonempty_fetch() {
        let mut cursor = PageCursor::new(2);
        assert_eq!(cursor.offset(), 0);
        assert!(cursor.advance(2));
        assert_eq!(cursor.offset(), 2);
        assert!(cursor.advance(1));
        assert_eq!(cursor.offset(), 4);
        assert!(!cursor.advance(0));
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn test_exactly_full_page_still_continues() {
        // Termination is decided by observed row count, not by comparing
        // against the chunk size.
        let mut cursor = PageCursor::new(100);
        assert!(cursor.advance(100));
        assert!(cursor.advance(100));
        assert_eq!(cursor.offset(), 200);
    }
}
