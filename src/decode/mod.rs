// src/decode/mod.rs
//! Synchronous, I/O-free decoder for the supported-devices feed:
//! UTF-16LE bytes → UTF-8 text → `\r\n` rows → dialect-aware fields → records.

pub mod builder;
pub mod encoding;
pub mod rows;
pub mod tokenizer;
pub mod unescape;

pub use builder::{build_records, DeviceRecord};
pub use encoding::{normalize, RawFeed, SourceEncoding};
pub use rows::split_rows;
pub use tokenizer::{split_fields, tokenize_row};
pub use unescape::unescape_field;

use crate::error::FeedResult;
use tracing::info;

/// Fields in every data row: brand, marketing name, device, model.
pub const FIELD_COUNT: usize = 4;

/// Delimited-text dialect of the feed.
///
/// `quote` and `escape` are separate roles even though the feed binds both to
/// `"`; the tokenizer tests them as distinct conditions. All markers must be
/// ASCII so byte-level splitting never lands inside a multi-byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    pub escape: u8,
    pub row_terminator: &'static str,
}

impl Dialect {
    pub const SUPPORTED_DEVICES: Dialect = Dialect {
        delimiter: b',',
        quote: b'"',
        escape: b'"',
        row_terminator: "\r\n",
    };

    /// True if `byte` plays either the quote or the escape role.
    pub(crate) fn is_special(&self, byte: u8) -> bool {
        byte == self.quote || byte == self.escape
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::SUPPORTED_DEVICES
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub dialect: Dialect,
    /// Accept a feed that yields zero records instead of failing with `EmptyFeed`.
    pub allow_empty: bool,
}

/// Diagnostics for one decode pass. Dropped rows are not errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Rows produced by the splitter, header included.
    pub rows: usize,
    pub records: usize,
    /// Rows that did not tokenize to the expected field count.
    pub malformed: usize,
    /// Empty or whitespace-only rows.
    pub blank: usize,
}

impl DecodeReport {
    pub fn dropped(&self) -> usize {
        self.malformed + self.blank
    }
}

/// Run the whole pipeline over one raw feed buffer.
#[tracing::instrument(
    level = "info",
    skip(feed, options),
    fields(bytes = feed.len(), encoding = feed.encoding().label())
)]
pub fn parse_feed(
    feed: &RawFeed<'_>,
    options: &DecodeOptions,
) -> FeedResult<(Vec<DeviceRecord>, DecodeReport)> {
    let text = normalize(feed)?;
    let (records, report) = build_records(split_rows(&text, &options.dialect), options)?;
    info!(
        records = report.records,
        malformed = report.malformed,
        blank = report.blank,
        "decoded feed"
    );
    Ok((records, report))
}
