use crate::error::{FeedError, FeedResult};
use encoding_rs::UTF_16LE;
use std::borrow::Cow;

const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Byte encodings the vendor publishes the feed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf16Le,
}

impl SourceEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf16Le => "UTF-16LE",
        }
    }
}

/// A downloaded feed body plus its declared encoding. Lives only for one decode.
#[derive(Debug, Clone, Copy)]
pub struct RawFeed<'a> {
    bytes: &'a [u8],
    encoding: SourceEncoding,
}

impl<'a> RawFeed<'a> {
    pub fn new(bytes: &'a [u8], encoding: SourceEncoding) -> Self {
        Self { bytes, encoding }
    }

    pub fn utf16le(bytes: &'a [u8]) -> Self {
        Self::new(bytes, SourceEncoding::Utf16Le)
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn encoding(&self) -> SourceEncoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Transcode the feed into UTF-8 without interpreting its content.
pub fn normalize(feed: &RawFeed<'_>) -> FeedResult<String> {
    match feed.encoding() {
        SourceEncoding::Utf16Le => utf16le_to_utf8(feed.bytes()),
    }
}

fn utf16le_to_utf8(bytes: &[u8]) -> FeedResult<String> {
    let label = SourceEncoding::Utf16Le.label();
    if bytes.len() % 2 != 0 {
        return Err(FeedError::Encoding {
            encoding: label,
            reason: format!("odd byte length {} leaves a dangling trailing byte", bytes.len()),
        });
    }

    let body = bytes.strip_prefix(&UTF16LE_BOM).unwrap_or(bytes);
    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| FeedError::Encoding {
            encoding: label,
            reason: "unpaired surrogate".into(),
        })
}
