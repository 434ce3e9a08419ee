//! Pattern-based highlighting for text the parser could not turn into an AST
//!
//! Rules claim ranges in a fixed order: comments, strings, keys and
//! operators, booleans and null, numbers, symbols. A rule never paints
//! inside a range an earlier rule already claimed.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::CommentKind;
use super::highlights::{HighlightSpan, LineSpanBuffer, StyleCategory};

/// Identifier at line start followed by an assignment symbol
static KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*([A-Za-z_][A-Za-z0-9_]*)[ \t]*=").unwrap());

/// Double- or single-quoted literal, escape aware
pub(crate) static STRING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'"#).unwrap());

pub(crate) static BOOLEAN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:true|false)\b").unwrap());

pub(crate) static NULL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnull\b").unwrap());

/// Signed integer or decimal, optional exponent
pub(crate) static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b").unwrap());

/// Byte offset of the first comment marker outside a quoted literal.
///
/// A quote left open at end of line does not hide a later marker: the
/// first `//` after the unmatched quote is the comment.
pub fn find_comment(text: &str) -> Option<(usize, CommentKind)> {
    let bytes = text.as_bytes();
    let mut quote: Option<(u8, usize)> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some((q, _)) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'\'' {
                    quote = Some((b, i));
                } else if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
                    return Some((i, CommentKind::from_text(&text[i..])));
                }
            }
        }
        i += 1;
    }

    let (_, open) = quote?;
    let start = open + 1 + text[open + 1..].find("//")?;
    Some((start, CommentKind::from_text(&text[start..])))
}

/// Comment or doc-comment span running from the marker to end of line
pub fn comment_span(text: &str) -> Option<HighlightSpan> {
    let (start, kind) = find_comment(text)?;
    let category = if kind.is_doc() {
        StyleCategory::DocComment
    } else {
        StyleCategory::Comment
    };
    Some(HighlightSpan::new(start, text.len() - start, category))
}

/// Ranges of quoted literals that start before any comment marker
pub fn string_ranges(text: &str) -> Vec<Range<usize>> {
    let code_end = find_comment(text).map_or(text.len(), |(start, _)| start);
    STRING_REGEX
        .find_iter(text)
        .map(|m| m.range())
        .filter(|r| r.start < code_end)
        .collect()
}

/// Claim the comment span of `text`, if any
pub fn apply_comments(text: &str, buf: &mut LineSpanBuffer) {
    if let Some(span) = comment_span(text) {
        buf.claim(span.start, span.len, span.category);
    }
}

fn claim_all(regex: &Regex, text: &str, category: StyleCategory, buf: &mut LineSpanBuffer) {
    for m in regex.find_iter(text) {
        buf.claim(m.start(), m.len(), category);
    }
}

/// Apply every fallback rule to one line, in precedence order
pub fn apply(text: &str, buf: &mut LineSpanBuffer) {
    apply_comments(text, buf);

    for range in string_ranges(text) {
        buf.claim(range.start, range.len(), StyleCategory::String);
    }

    if let Some(caps) = KEY_REGEX.captures(text) {
        if let Some(key) = caps.get(1) {
            buf.claim(key.start(), key.len(), StyleCategory::Key);
            if let Some(eq) = text[key.end()..].find('=') {
                buf.claim(key.end() + eq, 1, StyleCategory::Operator);
            }
        }
    }

    claim_all(&BOOLEAN_REGEX, text, StyleCategory::Boolean, buf);
    claim_all(&NULL_REGEX, text, StyleCategory::Null, buf);
    claim_all(&NUMBER_REGEX, text, StyleCategory::Number, buf);

    for (i, b) in text.bytes().enumerate() {
        if matches!(b, b'{' | b'}' | b'[' | b']' | b',') {
            buf.claim(i, 1, StyleCategory::Symbol);
        }
    }
}

/// Fallback spans for a single line
pub fn highlight(text: &str) -> Vec<HighlightSpan> {
    let mut buf = LineSpanBuffer::new(text);
    apply(text, &mut buf);
    buf.into_spans()
}
