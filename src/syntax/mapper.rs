//! AST → span mapping, one line at a time
//!
//! Nodes carry a line and an optional column hint. Exact offsets are
//! re-found in the line text: the hint is tried first, then the first free
//! literal match at or after it, then the first free match anywhere on the
//! line. A literal that recurs earlier on the same line can still be picked
//! when the parser supplies no column.

use std::ops::Range;

use regex::Regex;

use super::ast::{AstNode, AstRoot, Comment, KeyValue, List, Object, Scalar, ScalarValue, SourcePos};
use super::fallback::{self, BOOLEAN_REGEX, NULL_REGEX, NUMBER_REGEX, STRING_REGEX};
use super::highlights::{LineSpanBuffer, StyleCategory};
use crate::util::text::{column_offset, is_word_boundary};

/// Emit every span of `root` whose node sits on `line` (1-based)
pub fn map_line(root: &AstRoot, line: usize, text: &str, buf: &mut LineSpanBuffer) {
    let mut mapper = SpanMapper::new(line, text, buf);
    mapper.root(root);
}

struct SpanMapper<'a> {
    line: usize,
    text: &'a str,
    buf: &'a mut LineSpanBuffer,
    /// Quoted literal ranges on this line; delimiters inside them are not code
    strings: Vec<Range<usize>>,
    /// Start of the line comment, if any
    code_end: usize,
}

impl<'a> SpanMapper<'a> {
    fn new(line: usize, text: &'a str, buf: &'a mut LineSpanBuffer) -> Self {
        Self {
            line,
            text,
            buf,
            strings: fallback::string_ranges(text),
            code_end: fallback::find_comment(text).map_or(text.len(), |(start, _)| start),
        }
    }

    fn on_line(&self, pos: SourcePos) -> bool {
        pos.line == self.line
    }

    fn in_code(&self, offset: usize) -> bool {
        offset < self.code_end && !self.strings.iter().any(|r| r.contains(&offset))
    }

    fn root(&mut self, root: &AstRoot) {
        for comment in &root.inner_doc {
            self.comment(comment);
        }
        for kv in root.entries.values() {
            self.key_value(kv);
        }
        for comment in &root.trailing_comments {
            self.comment(comment);
        }
    }

    fn node(&mut self, node: &AstNode) {
        match node {
            AstNode::KeyValue(kv) => self.key_value(kv),
            AstNode::Scalar(scalar) => self.scalar(scalar),
            AstNode::Object(object) => self.object(object),
            AstNode::List(list) => self.list(list),
            AstNode::Comment(comment) => self.comment(comment),
        }
    }

    fn key_value(&mut self, kv: &KeyValue) {
        for comment in &kv.leading_comments {
            self.comment(comment);
        }

        if self.on_line(kv.pos) {
            let from = column_offset(self.text, kv.pos.column);
            let key_end = self
                .claim_key(&kv.key, from)
                .unwrap_or_else(|| from.min(self.text.len()));
            self.claim_operator(key_end);
        }

        self.node(&kv.value);

        if let Some(comment) = &kv.trailing_comment {
            self.comment(comment);
        }
    }

    /// Claim the key literal (bare or quoted); returns its end offset
    fn claim_key(&mut self, key: &str, from: usize) -> Option<usize> {
        let bare = self.text.match_indices(key).map(|(i, _)| i..i + key.len());
        let candidates: Vec<Range<usize>> = bare
            .filter(|r| is_word_boundary(self.text, r.start, r.end) && self.in_code(r.start))
            .collect();
        if let Some(range) = self.claim_first(&candidates, from, StyleCategory::Key) {
            return Some(range.end);
        }

        let quoted: Vec<Range<usize>> = self
            .strings
            .iter()
            .filter(|r| {
                self.text
                    .get(r.start + 1..r.end.saturating_sub(1))
                    .is_some_and(|inner| inner == key)
            })
            .cloned()
            .collect();
        self.claim_first(&quoted, from, StyleCategory::Key)
            .map(|range| range.end)
    }

    /// Next assignment symbol after the key that is code, not string content
    fn claim_operator(&mut self, from: usize) {
        let Some(rest) = self.text.get(from..) else {
            return;
        };
        if let Some(offset) = rest
            .match_indices('=')
            .map(|(i, _)| from + i)
            .find(|&i| self.in_code(i))
        {
            self.buf.claim(offset, 1, StyleCategory::Operator);
        }
    }

    /// Claim the first free candidate at or after `from`, else the first free
    /// candidate on the line. Candidates must be sorted by start.
    fn claim_first(
        &mut self,
        candidates: &[Range<usize>],
        from: usize,
        category: StyleCategory,
    ) -> Option<Range<usize>> {
        let after = candidates.iter().filter(|r| r.start >= from);
        let before = candidates.iter().filter(|r| r.start < from);
        for range in after.chain(before) {
            if self.buf.claim(range.start, range.len(), category) {
                return Some(range.clone());
            }
        }
        None
    }

    fn regex_candidates(&self, regex: &Regex, literal: Option<&str>) -> Vec<Range<usize>> {
        regex
            .find_iter(self.text)
            .filter(|m| literal.map_or(true, |lit| m.as_str() == lit))
            .map(|m| m.range())
            .filter(|r| r.start < self.code_end)
            .collect()
    }

    fn scalar(&mut self, scalar: &Scalar) {
        if !self.on_line(scalar.pos) {
            return;
        }
        let from = column_offset(self.text, scalar.pos.column);

        // Order matters: booleans and null are tried before the numeric
        // pattern so their text is never classified as a number.
        let (candidates, category) = match &scalar.value {
            ScalarValue::String(_) => (self.strings.clone(), StyleCategory::String),
            ScalarValue::Bool(value) => {
                let literal = if *value { "true" } else { "false" };
                (
                    self.regex_candidates(&BOOLEAN_REGEX, Some(literal)),
                    StyleCategory::Boolean,
                )
            }
            ScalarValue::Null => (
                self.regex_candidates(&NULL_REGEX, None),
                StyleCategory::Null,
            ),
            ScalarValue::Number(_) => (
                self.regex_candidates(&NUMBER_REGEX, None)
                    .into_iter()
                    .filter(|r| self.in_code(r.start))
                    .collect(),
                StyleCategory::Number,
            ),
        };

        if self.claim_first(&candidates, from, category).is_none() {
            tracing::trace!(
                "line {}: no free {:?} literal for scalar at {:?}",
                self.line,
                category,
                scalar.pos
            );
        }
    }

    fn delimiter(&mut self, pos: SourcePos, ch: char) {
        let from = column_offset(self.text, pos.column);
        let candidates: Vec<Range<usize>> = self
            .text
            .match_indices(ch)
            .map(|(i, _)| i..i + 1)
            .filter(|r| self.in_code(r.start))
            .collect();
        self.claim_first(&candidates, from, StyleCategory::Symbol);
    }

    /// Closing delimiter: exact when the parser recorded it, otherwise the
    /// last one on the container's opening line.
    fn closing(&mut self, open: SourcePos, close: Option<SourcePos>, ch: char) {
        match close {
            Some(close) => {
                if self.on_line(close) {
                    self.delimiter(close, ch);
                }
            }
            None => {
                if self.on_line(open) {
                    let last = self
                        .text
                        .rmatch_indices(ch)
                        .map(|(i, _)| i)
                        .find(|&i| self.in_code(i));
                    if let Some(offset) = last {
                        self.buf.claim(offset, 1, StyleCategory::Symbol);
                    }
                }
            }
        }
    }

    fn separators(&mut self) {
        let commas: Vec<usize> = self
            .text
            .match_indices(',')
            .map(|(i, _)| i)
            .filter(|&i| self.in_code(i))
            .collect();
        for offset in commas {
            self.buf.claim(offset, 1, StyleCategory::Symbol);
        }
    }

    fn object(&mut self, object: &Object) {
        if self.on_line(object.pos) {
            self.delimiter(object.pos, '{');
        }
        for comment in &object.inner_doc {
            self.comment(comment);
        }

        let mut member_here = self.on_line(object.pos);
        for kv in object.entries.values() {
            member_here |= self.on_line(kv.pos);
            self.key_value(kv);
        }
        if member_here {
            self.separators();
        }

        for comment in &object.trailing_comments {
            self.comment(comment);
        }
        self.closing(object.pos, object.close, '}');
    }

    fn list(&mut self, list: &List) {
        if self.on_line(list.pos) {
            self.delimiter(list.pos, '[');
        }
        for comment in &list.inner_doc {
            self.comment(comment);
        }

        let mut member_here = self.on_line(list.pos);
        for element in &list.elements {
            member_here |= self.on_line(element.pos());
            self.node(element);
        }
        if member_here {
            self.separators();
        }

        for comment in &list.trailing_comments {
            self.comment(comment);
        }
        self.closing(list.pos, list.close, ']');
    }

    fn comment(&mut self, comment: &Comment) {
        if !self.on_line(comment.pos) {
            return;
        }
        let category = if comment.kind.is_doc() {
            StyleCategory::DocComment
        } else {
            StyleCategory::Comment
        };

        let start = self
            .text
            .find(comment.text.as_str())
            .or_else(|| fallback::find_comment(self.text).map(|(start, _)| start));
        match start {
            Some(start) => {
                self.buf.claim(start, self.text.len() - start, category);
            }
            None => {
                tracing::trace!("line {}: comment marker not found", self.line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::highlights::HighlightSpan;
    use indexmap::IndexMap;

    fn scalar(value: ScalarValue, line: usize, column: Option<usize>) -> AstNode {
        AstNode::Scalar(Scalar {
            value,
            pos: SourcePos { line, column },
        })
    }

    fn kv(key: &str, value: AstNode, line: usize, column: Option<usize>) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: Box::new(value),
            leading_comments: vec![],
            trailing_comment: None,
            pos: SourcePos { line, column },
        }
    }

    fn root(entries: Vec<KeyValue>) -> AstRoot {
        AstRoot {
            entries: entries.into_iter().map(|e| (e.key.clone(), e)).collect(),
            ..Default::default()
        }
    }

    fn map(root: &AstRoot, line: usize, text: &str) -> Vec<HighlightSpan> {
        let mut buf = LineSpanBuffer::new(text);
        map_line(root, line, text, &mut buf);
        buf.into_spans()
    }

    fn texts<'t>(spans: &[HighlightSpan], text: &'t str, category: StyleCategory) -> Vec<&'t str> {
        spans
            .iter()
            .filter(|s| s.category == category)
            .filter_map(|s| s.text(text))
            .collect()
    }

    #[test]
    fn test_key_operator_string() {
        let text = r#"name = "x""#;
        let ast = root(vec![kv(
            "name",
            scalar(ScalarValue::String("x".into()), 1, None),
            1,
            None,
        )]);
        let spans = map(&ast, 1, text);
        assert_eq!(texts(&spans, text, StyleCategory::Key), vec!["name"]);
        assert_eq!(texts(&spans, text, StyleCategory::Operator), vec!["="]);
        assert_eq!(texts(&spans, text, StyleCategory::String), vec![r#""x""#]);
    }

    #[test]
    fn test_boolean_is_never_number() {
        let text = "flag = false";
        let ast = root(vec![kv(
            "flag",
            scalar(ScalarValue::Bool(false), 1, None),
            1,
            None,
        )]);
        let spans = map(&ast, 1, text);
        assert_eq!(texts(&spans, text, StyleCategory::Boolean), vec!["false"]);
        assert!(texts(&spans, text, StyleCategory::Number).is_empty());
    }

    #[test]
    fn test_other_lines_are_ignored() {
        let ast = root(vec![kv(
            "a",
            scalar(ScalarValue::Number(1.0), 1, None),
            1,
            None,
        )]);
        assert!(map(&ast, 2, "a = 1").is_empty());
    }

    #[test]
    fn test_key_must_be_whole_word() {
        let text = "ab = b";
        let ast = root(vec![kv(
            "b",
            scalar(ScalarValue::Null, 1, None),
            1,
            None,
        )]);
        let spans = map(&ast, 1, text);
        assert_eq!(spans.iter().find(|s| s.category == StyleCategory::Key).map(|s| s.start), Some(5));
    }

    #[test]
    fn test_column_hint_picks_the_right_repeat() {
        // Two list elements with the same literal on one line
        let text = "xs = [7, 7]";
        let list = AstNode::List(List {
            elements: vec![
                scalar(ScalarValue::Number(7.0), 1, Some(10)),
                scalar(ScalarValue::Number(7.0), 1, Some(7)),
            ],
            pos: SourcePos::new(1, 6),
            close: Some(SourcePos::new(1, 11)),
            ..Default::default()
        });
        let ast = root(vec![kv("xs", list, 1, Some(1))]);
        let spans = map(&ast, 1, text);
        let numbers: Vec<usize> = spans
            .iter()
            .filter(|s| s.category == StyleCategory::Number)
            .map(|s| s.start)
            .collect();
        assert_eq!(numbers, vec![6, 9]);
        assert_eq!(texts(&spans, text, StyleCategory::Symbol), vec!["[", ",", "]"]);
    }

    #[test]
    fn test_repeated_literal_without_hints_claims_each_once() {
        let text = "xs = [1, 1]";
        let list = AstNode::List(List {
            elements: vec![
                scalar(ScalarValue::Number(1.0), 1, None),
                scalar(ScalarValue::Number(1.0), 1, None),
            ],
            pos: SourcePos::line_only(1),
            ..Default::default()
        });
        let ast = root(vec![kv("xs", list, 1, None)]);
        let spans = map(&ast, 1, text);
        assert_eq!(texts(&spans, text, StyleCategory::Number), vec!["1", "1"]);
    }

    #[test]
    fn test_multiline_object_braces() {
        let lines = ["server = {", "  port = 80", "}"];
        let mut entries = IndexMap::new();
        entries.insert(
            "port".to_string(),
            kv("port", scalar(ScalarValue::Number(80.0), 2, Some(10)), 2, Some(3)),
        );
        let object = AstNode::Object(Object {
            entries,
            pos: SourcePos::new(1, 10),
            close: Some(SourcePos::new(3, 1)),
            ..Default::default()
        });
        let ast = root(vec![kv("server", object, 1, Some(1))]);

        let first = map(&ast, 1, lines[0]);
        assert_eq!(texts(&first, lines[0], StyleCategory::Symbol), vec!["{"]);
        assert_eq!(texts(&first, lines[0], StyleCategory::Key), vec!["server"]);

        let second = map(&ast, 2, lines[1]);
        assert_eq!(texts(&second, lines[1], StyleCategory::Key), vec!["port"]);
        assert_eq!(texts(&second, lines[1], StyleCategory::Number), vec!["80"]);

        let third = map(&ast, 3, lines[2]);
        assert_eq!(texts(&third, lines[2], StyleCategory::Symbol), vec!["}"]);
    }

    #[test]
    fn test_closing_heuristic_without_close_position() {
        let text = "o = { a = 1 }";
        let mut entries = IndexMap::new();
        entries.insert(
            "a".to_string(),
            kv("a", scalar(ScalarValue::Number(1.0), 1, None), 1, None),
        );
        let object = AstNode::Object(Object {
            entries,
            pos: SourcePos::line_only(1),
            ..Default::default()
        });
        let ast = root(vec![kv("o", object, 1, None)]);
        let spans = map(&ast, 1, text);
        assert_eq!(texts(&spans, text, StyleCategory::Symbol), vec!["{", "}"]);
        assert_eq!(texts(&spans, text, StyleCategory::Key), vec!["o", "a"]);
    }

    #[test]
    fn test_attached_comments() {
        let lines = ["/// the answer", "answer = 42 // inline"];
        let mut entry = kv("answer", scalar(ScalarValue::Number(42.0), 2, None), 2, None);
        entry.leading_comments.push(Comment::new("/// the answer", SourcePos::line_only(1)));
        entry.trailing_comment = Some(Comment::new("// inline", SourcePos::line_only(2)));
        let ast = root(vec![entry]);

        let first = map(&ast, 1, lines[0]);
        assert_eq!(texts(&first, lines[0], StyleCategory::DocComment), vec!["/// the answer"]);

        let second = map(&ast, 2, lines[1]);
        assert_eq!(texts(&second, lines[1], StyleCategory::Comment), vec!["// inline"]);
        assert_eq!(texts(&second, lines[1], StyleCategory::Number), vec!["42"]);
    }

    #[test]
    fn test_comma_inside_string_is_not_a_separator() {
        let text = r#"xs = ["a,b", 'c']"#;
        let list = AstNode::List(List {
            elements: vec![
                scalar(ScalarValue::String("a,b".into()), 1, None),
                scalar(ScalarValue::String("c".into()), 1, None),
            ],
            pos: SourcePos::line_only(1),
            ..Default::default()
        });
        let ast = root(vec![kv("xs", list, 1, None)]);
        let spans = map(&ast, 1, text);
        assert_eq!(texts(&spans, text, StyleCategory::Symbol), vec!["[", ",", "]"]);
        assert_eq!(
            texts(&spans, text, StyleCategory::String),
            vec![r#""a,b""#, "'c'"]
        );
    }

    #[test]
    fn test_quoted_key() {
        let text = r#""my key" = null"#;
        let ast = root(vec![kv("my key", scalar(ScalarValue::Null, 1, None), 1, None)]);
        let spans = map(&ast, 1, text);
        assert_eq!(texts(&spans, text, StyleCategory::Key), vec![r#""my key""#]);
        assert_eq!(texts(&spans, text, StyleCategory::Null), vec!["null"]);
    }
}
