//! Text indexing helpers shared by the span mapper and error locator

/// Byte offset of the `col`-th character (0-based), clamped to the line end
pub fn char_to_byte(text: &str, col: usize) -> usize {
    text.char_indices()
        .nth(col)
        .map_or(text.len(), |(offset, _)| offset)
}

/// Byte length of `chars` characters starting at byte `start`
pub fn chars_to_bytes(text: &str, start: usize, chars: usize) -> usize {
    let start = start.min(text.len());
    text[start..]
        .char_indices()
        .nth(chars)
        .map_or(text.len() - start, |(offset, _)| offset)
}

/// Byte offset for a 1-based column hint, or 0 without one
pub fn column_offset(text: &str, column: Option<usize>) -> usize {
    column.map_or(0, |c| char_to_byte(text, c.saturating_sub(1)))
}

/// Identifier character for key boundary checks
pub fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// True if `text[start..end]` is not glued to identifier characters
pub fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
}

/// Split a buffer into lines the way an editor counts them: a trailing
/// newline opens one more (empty) line, and `\r\n` endings are stripped.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}
