use super::Dialect;
use crate::error::{FeedError, FeedResult};

/// Turn a delimiter-bounded raw field into its value.
///
/// Surrounding quotes are structural and dropped; every escape+quote pair
/// collapses to one literal quote. Compaction is a single forward pass with a
/// write cursor trailing the read cursor.
pub fn unescape_field(raw: &[u8], dialect: &Dialect) -> FeedResult<String> {
    let inner = match raw {
        [first, inner @ .., last] if *first == dialect.quote && *last == dialect.quote => inner,
        _ => raw,
    };

    let mut buf = inner.to_vec();
    if buf.contains(&dialect.escape) {
        let mut write = 0;
        let mut read = 0;
        while read < buf.len() {
            if buf[read] == dialect.escape && buf.get(read + 1) == Some(&dialect.quote) {
                read += 1;
            }
            buf[write] = buf[read];
            write += 1;
            read += 1;
        }
        buf.truncate(write);
    }

    String::from_utf8(buf).map_err(|e| FeedError::Encoding {
        encoding: "UTF-8",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(raw: &str) -> String {
        unescape_field(raw.as_bytes(), &Dialect::default()).unwrap()
    }

    #[test]
    fn strips_quotes_and_collapses_escapes() {
        assert_eq!(unescape(r#""Bob""s Phone""#), r#"Bob"s Phone"#);
        assert_eq!(unescape(r#""a""""#), r#"a""#);
        assert_eq!(unescape(r#""""""#), r#"""#);
    }

    #[test]
    fn empty_quoted_field_is_empty() {
        assert_eq!(unescape(r#""""#), "");
        assert_eq!(unescape(""), "");
    }

    #[test]
    fn lone_quote_is_data() {
        assert_eq!(unescape(r#"""#), r#"""#);
    }

    #[test]
    fn unquoted_field_passes_through() {
        assert_eq!(unescape("Galaxy S7"), "Galaxy S7");
        assert_eq!(unescape(r#"5" Tab"#), r#"5" Tab"#);
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        assert_eq!(unescape("\"华为 \"\"Mate\"\" 9\""), "华为 \"Mate\" 9");
    }

    #[test]
    fn distinct_escape_role() {
        let dialect = Dialect {
            escape: b'\\',
            ..Dialect::default()
        };
        let value = unescape_field(br#""say \"hi\"""#, &dialect).unwrap();
        assert_eq!(value, r#"say "hi""#);
    }
}
