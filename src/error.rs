use thiserror::Error;

/// Errors raised by the feed decoder and the lookup index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    // ── Encoding ──────────────────────────────────────────────────────────────
    #[error("feed is not valid {encoding}: {reason}")]
    Encoding {
        encoding: &'static str,
        reason: String,
    },

    // ── Rows ──────────────────────────────────────────────────────────────────
    /// Recovered locally by the record builder; the row is dropped.
    #[error("malformed row ({found} fields, expected {expected}): {row:?}")]
    MalformedRow {
        row: String,
        found: usize,
        expected: usize,
    },

    #[error("feed contained {rows} rows but no usable device records")]
    EmptyFeed { rows: usize },

    // ── Lookup ────────────────────────────────────────────────────────────────
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;
