use super::Dialect;

/// Split canonical text into rows on the dialect's literal terminator.
///
/// The split is purely positional: a terminator inside a quoted field still
/// ends the row, and the two halves surface later as malformed rows. The
/// returned iterator is lazy and `Clone`, so a pass can be restarted.
pub fn split_rows<'a>(
    text: &'a str,
    dialect: &Dialect,
) -> impl Iterator<Item = &'a str> + Clone + 'a {
    let terminator = dialect.row_terminator;
    text.split(terminator)
}
