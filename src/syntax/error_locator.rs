//! Turns a parser failure into a renderable error location
//!
//! The result is a rendering position only; it is not re-validated against
//! the grammar.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::ast::ParseError;
use crate::util::text::{char_to_byte, chars_to_bytes};

/// Token patterns tried in order against the error message
static TOKEN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\bgot\s+`([^`]+)`").unwrap(),
        Regex::new(r"\bGot\s+[A-Z][A-Z_]*\s+(\S+)").unwrap(),
        Regex::new(r"(?i)\bunexpected\s+(?:token|character)\s+'([^']+)'").unwrap(),
    ]
});

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bline\s+(\d+)").unwrap());
static COLUMN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcol(?:umn)?\s+(\d+)").unwrap());

/// Externally observable error entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// 1-based line
    pub line: usize,
    /// 1-based character column
    pub column: usize,
    /// Length in characters
    pub length: usize,
    pub message: String,
    pub token: Option<String>,
}

/// Offending token mentioned in an error message, if any pattern matches
pub fn extract_token(message: &str) -> Option<String> {
    TOKEN_PATTERNS.iter().find_map(|re| {
        re.captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn extract_number(re: &Regex, message: &str) -> Option<usize> {
    re.captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|n| *n > 0)
}

/// Build the error record for a parse failure.
///
/// Structured line/column win; otherwise they are recovered from the
/// message; otherwise the error is pinned to line 1, column 1.
pub fn locate(error: &ParseError) -> ErrorRecord {
    let line = error
        .line
        .filter(|l| *l > 0)
        .or_else(|| extract_number(&LINE_PATTERN, &error.message))
        .unwrap_or(1);
    let column = error
        .column
        .filter(|c| *c > 0)
        .or_else(|| extract_number(&COLUMN_PATTERN, &error.message))
        .unwrap_or(1);
    let token = error
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| extract_token(&error.message));
    let length = token.as_ref().map_or(1, |t| t.chars().count().max(1));

    ErrorRecord {
        line,
        column,
        length,
        message: error.message.clone(),
        token,
    }
}

/// Resolve a record to a byte range on its line's text.
///
/// A column at or past the last non-whitespace character is clamped to that
/// character (or offset 0 on a blank line). Otherwise, when a token is known,
/// the line is searched for it from the column, then from the line start.
pub fn resolve(record: &ErrorRecord, text: &str) -> (usize, usize) {
    let mut start = char_to_byte(text, record.column.saturating_sub(1));
    let mut len = chars_to_bytes(text, start, record.length.max(1));

    let trimmed_len = text.trim_end().len();
    if start >= trimmed_len {
        return match text[..trimmed_len].char_indices().next_back() {
            Some((last, ch)) => (last, ch.len_utf8()),
            None => (0, text.chars().next().map_or(1, char::len_utf8)),
        };
    }

    if let Some(token) = record.token.as_deref() {
        let found = text[start..]
            .find(token)
            .map(|pos| start + pos)
            .or_else(|| text.find(token));
        if let Some(pos) = found {
            start = pos;
            len = token.len();
        } else {
            tracing::debug!(
                "error token {:?} not found on line {}, using column {}",
                token,
                record.line,
                record.column
            );
        }
    }

    (start, len.min(text.len() - start).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(column: usize, token: Option<&str>) -> ErrorRecord {
        ErrorRecord {
            line: 1,
            column,
            length: token.map_or(1, |t| t.chars().count()),
            message: String::from("boom"),
            token: token.map(String::from),
        }
    }

    #[test]
    fn test_structured_position_wins() {
        let err = ParseError::at("expected value at line 9, col 9", 2, 5);
        let rec = locate(&err);
        assert_eq!((rec.line, rec.column, rec.length), (2, 5, 1));
    }

    #[test]
    fn test_position_recovered_from_message() {
        let err = ParseError::new("Expected value at line 3, col 7. Got EOF");
        let rec = locate(&err);
        assert_eq!((rec.line, rec.column), (3, 7));
    }

    #[test]
    fn test_missing_position_defaults_to_origin() {
        let rec = locate(&ParseError::new("something broke"));
        assert_eq!((rec.line, rec.column, rec.length), (1, 1, 1));
        assert_eq!(rec.token, None);
    }

    #[test]
    fn test_backtick_token_sets_length() {
        let err = ParseError::at("expected '=' at line 1, col 5, got `value`", 1, 5);
        let rec = locate(&err);
        assert_eq!(rec.token.as_deref(), Some("value"));
        assert_eq!(rec.length, 5);
    }

    #[test]
    fn test_typed_token_pattern() {
        assert_eq!(
            extract_token("Unexpected token at line 1, col 4. Got RBRACE }"),
            Some(String::from("}"))
        );
        assert_eq!(extract_token("got end of input"), None);
        assert_eq!(extract_token("Got end of input"), None);
        assert_eq!(extract_token("Expected value. Got end of line"), None);
    }

    #[test]
    fn test_clamp_past_end_to_last_non_whitespace() {
        let text = "key =   ";
        assert_eq!(resolve(&record(9, None), text), (4, 1));
        assert_eq!(resolve(&record(5, None), text), (4, 1));
    }

    #[test]
    fn test_clamp_on_blank_line() {
        assert_eq!(resolve(&record(4, None), "    "), (0, 1));
        assert_eq!(resolve(&record(1, None), ""), (0, 1));
    }

    #[test]
    fn test_token_search_corrects_column_drift() {
        let text = "a = [1, 2 3]";
        // Parser column points one character early
        assert_eq!(resolve(&record(10, Some("3")), text), (10, 1));
    }

    #[test]
    fn test_token_search_falls_back_to_whole_line() {
        let text = "oops = 1";
        assert_eq!(resolve(&record(6, Some("oops")), text), (0, 4));
    }

    #[test]
    fn test_column_counts_characters() {
        let text = "é = ?";
        assert_eq!(resolve(&record(5, Some("?")), text), (5, 1));
        assert_eq!(resolve(&record(1, None), text), (0, 2));
    }
}
