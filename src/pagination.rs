use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Keyset pagination cursor: the `(created_at, id)` key of the last row a
/// client has seen, encoded as an opaque `<timestamp_micros>:<uuid>` string.
///
/// Listings order by `(created_at, id)` so the tuple is a total order even
/// when timestamps collide; a query resumed from a cursor returns only rows
/// strictly past it in the active direction, so concurrent inserts can never
/// shift rows into or out of already-served pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.created_at.timestamp_micros(), self.id)
    }

    /// Decode an opaque cursor string. Malformed input is a client error
    /// (`invalid_cursor`), never a silent reset to the first page.
    pub fn decode(raw: &str) -> Result<Self, ApiError> {
        let (micros_raw, id_raw) = raw.split_once(':').ok_or(ApiError::InvalidCursor)?;
        let micros: i64 = micros_raw.parse().map_err(|_| ApiError::InvalidCursor)?;
        let created_at =
            DateTime::from_timestamp_micros(micros).ok_or(ApiError::InvalidCursor)?;
        let id = Uuid::parse_str(id_raw).map_err(|_| ApiError::InvalidCursor)?;
        Ok(Self { created_at, id })
    }
}

/// Common `?limit=&cursor=` query parameters shared by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub cursor: Option<String>,
}

impl PageQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    /// Parse the cursor, if any. An empty string counts as no cursor.
    pub fn cursor(&self) -> Result<Option<Cursor>, ApiError> {
        self.cursor
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(Cursor::decode)
            .transpose()
    }
}

/// List response envelope. `next_cursor: None` signals end of data.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Assemble a page from a `limit + 1` fetch. The extra row only proves
    /// there is more data; it is trimmed before the next cursor is derived
    /// from the last row actually returned.
    pub fn from_rows(mut rows: Vec<T>, limit: u64, key: impl Fn(&T) -> Cursor) -> Self {
        let has_more = rows.len() as u64 > limit;
        if has_more {
            rows.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            rows.last().map(|row| key(row).encode())
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cursor_at(secs: i64) -> Cursor {
        Cursor::new(Utc.timestamp_opt(secs, 0).unwrap(), Uuid::new_v4())
    }

    #[test]
    fn cursor_roundtrips_through_encoding() {
        let cursor = Cursor::new(
            Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            Uuid::new_v4(),
        );
        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn cursor_preserves_sub_second_precision() {
        let created_at = DateTime::from_timestamp_micros(1_773_334_811_123_456).unwrap();
        let cursor = Cursor::new(created_at, Uuid::new_v4());
        assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn malformed_cursors_are_rejected() {
        for raw in [
            "",
            "garbage",
            "12345",
            ":",
            "not-a-number:9a2f7c0e-1f6b-4f7e-8f43-0c6d0f1a2b3c",
            "12345:not-a-uuid",
        ] {
            assert!(
                matches!(Cursor::decode(raw), Err(ApiError::InvalidCursor)),
                "expected InvalidCursor for {raw:?}"
            );
        }
    }

    #[test]
    fn page_query_rejects_bad_cursor_instead_of_resetting() {
        let query = PageQuery {
            limit: None,
            cursor: Some("bad".to_string()),
        };
        assert!(matches!(query.cursor(), Err(ApiError::InvalidCursor)));
    }

    #[test]
    fn page_query_clamps_limit() {
        assert_eq!(PageQuery::default().limit(), 20);
        let big = PageQuery {
            limit: Some(10_000),
            cursor: None,
        };
        assert_eq!(big.limit(), 100);
        let zero = PageQuery {
            limit: Some(0),
            cursor: None,
        };
        assert_eq!(zero.limit(), 1);
    }

    #[test]
    fn full_fetch_trims_and_yields_next_cursor() {
        let rows: Vec<Cursor> = (0..4).rev().map(cursor_at).collect();
        let page = Page::from_rows(rows.clone(), 3, |c| *c);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.next_cursor, Some(rows[2].encode()));
    }

    #[test]
    fn short_fetch_ends_pagination() {
        let rows: Vec<Cursor> = (0..3).rev().map(cursor_at).collect();
        let page = Page::from_rows(rows, 3, |c| *c);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn paging_a_snapshot_visits_every_row_once() {
        // Simulate the repository contract over an in-memory snapshot ordered
        // by (created_at desc, id desc): fetch limit + 1 rows past the cursor,
        // assemble the page, repeat until next_cursor is null.
        let mut snapshot: Vec<Cursor> = (0..10).map(|i| cursor_at(1000 + i / 2)).collect();
        snapshot.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let limit = 3u64;
        let mut cursor: Option<Cursor> = None;
        let mut seen: Vec<Cursor> = Vec::new();
        loop {
            let window: Vec<Cursor> = snapshot
                .iter()
                .filter(|row| match cursor {
                    Some(c) => (row.created_at, row.id) < (c.created_at, c.id),
                    None => true,
                })
                .take(limit as usize + 1)
                .copied()
                .collect();
            let page = Page::from_rows(window, limit, |c| *c);
            seen.extend(page.items.iter().copied());
            match page.next_cursor {
                Some(raw) => cursor = Some(Cursor::decode(&raw).unwrap()),
                None => break,
            }
        }
        assert_eq!(seen, snapshot);
    }
}
