use super::unescape::unescape_field;
use super::{Dialect, FIELD_COUNT};
use crate::error::{FeedError, FeedResult};

/// Tokenize one row and check it has exactly `FIELD_COUNT` fields.
///
/// Returns `Ok(None)` for an empty or whitespace-only row: such rows are
/// skipped, not counted as malformed.
pub fn tokenize_row(row: &str, dialect: &Dialect) -> FeedResult<Option<Vec<String>>> {
    if row.trim().is_empty() {
        return Ok(None);
    }

    let fields = split_fields(row, dialect)?;
    if fields.len() != FIELD_COUNT {
        return Err(FeedError::MalformedRow {
            row: row.to_string(),
            found: fields.len(),
            expected: FIELD_COUNT,
        });
    }
    Ok(Some(fields))
}

/// Split a row into unescaped field values, scanning bytes so a delimiter can
/// never be matched inside a multi-byte sequence.
pub fn split_fields(row: &str, dialect: &Dialect) -> FeedResult<Vec<String>> {
    let bytes = row.as_bytes();
    if !bytes.iter().any(|&b| dialect.is_special(b)) {
        return Ok(row
            .split(char::from(dialect.delimiter))
            .map(str::to_owned)
            .collect());
    }

    let end = bytes.len();
    let mut fields = Vec::new();
    let mut is_quoted = false;
    // start of the current field
    let mut offset = 0;
    let mut i = 0;

    while i < end {
        let byte = bytes[i];
        let next = bytes.get(i + 1).copied();

        if is_quoted {
            if byte == dialect.quote && next.map_or(true, |n| n == dialect.delimiter) {
                is_quoted = false;
            } else if byte == dialect.escape && next == Some(dialect.quote) {
                // escaped quote: consume both bytes as data
                i += 1;
            }
        } else if byte == dialect.quote && i == offset {
            is_quoted = true;
        } else if byte == dialect.delimiter {
            fields.push(unescape_field(&bytes[offset..i], dialect)?);
            offset = i + 1;
        }

        i += 1;
    }

    if offset < end {
        fields.push(unescape_field(&bytes[offset..end], dialect)?);
    } else {
        // the row ended on a field-ending delimiter
        fields.push(String::new());
    }

    Ok(fields)
}
