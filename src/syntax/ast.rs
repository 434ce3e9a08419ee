//! Read-only AST handed over by the parser boundary
//!
//! Nodes carry 1-based source positions and never reference the buffer they
//! were parsed from.

use indexmap::IndexMap;

/// 1-based source position. `column` is an optional exact-column hint: when
/// present the span mapper tries it before falling back to searching the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    pub line: usize,
    pub column: Option<usize>,
}

impl SourcePos {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column: Some(column),
        }
    }

    /// A position known only by line
    pub fn line_only(line: usize) -> Self {
        Self { line, column: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...`
    Plain,
    /// `/// ...` documents the entry that follows
    LeadingDoc,
    /// `//! ...` documents the enclosing container
    TrailingDoc,
}

impl CommentKind {
    /// Classify a comment by its marker prefix
    pub fn from_text(text: &str) -> Self {
        if text.starts_with("//!") {
            CommentKind::TrailingDoc
        } else if text.starts_with("///") {
            CommentKind::LeadingDoc
        } else {
            CommentKind::Plain
        }
    }

    pub fn is_doc(self) -> bool {
        !matches!(self, CommentKind::Plain)
    }

    pub fn marker(self) -> &'static str {
        match self {
            CommentKind::Plain => "//",
            CommentKind::LeadingDoc => "///",
            CommentKind::TrailingDoc => "//!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Full comment text including its marker
    pub text: String,
    pub kind: CommentKind,
    pub pos: SourcePos,
}

impl Comment {
    pub fn new(text: impl Into<String>, pos: SourcePos) -> Self {
        let text = text.into();
        let kind = CommentKind::from_text(&text);
        Self { text, kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub value: ScalarValue,
    pub pos: SourcePos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Box<AstNode>,
    pub leading_comments: Vec<Comment>,
    pub trailing_comment: Option<Comment>,
    pub pos: SourcePos,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    pub entries: IndexMap<String, KeyValue>,
    /// `//!` comments documenting this object
    pub inner_doc: Vec<Comment>,
    /// Comments after the last entry
    pub trailing_comments: Vec<Comment>,
    pub pos: SourcePos,
    /// Position of the closing `}` when the parser knows it
    pub close: Option<SourcePos>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct List {
    pub elements: Vec<AstNode>,
    pub inner_doc: Vec<Comment>,
    pub trailing_comments: Vec<Comment>,
    pub pos: SourcePos,
    pub close: Option<SourcePos>,
}

/// Closed set of node kinds; the span mapper matches on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    KeyValue(KeyValue),
    Scalar(Scalar),
    Object(Object),
    List(List),
    Comment(Comment),
}

impl AstNode {
    pub fn pos(&self) -> SourcePos {
        match self {
            AstNode::KeyValue(kv) => kv.pos,
            AstNode::Scalar(s) => s.pos,
            AstNode::Object(o) => o.pos,
            AstNode::List(l) => l.pos,
            AstNode::Comment(c) => c.pos,
        }
    }
}

/// Top level of a parsed document: an object without delimiters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AstRoot {
    pub entries: IndexMap<String, KeyValue>,
    pub inner_doc: Vec<Comment>,
    pub trailing_comments: Vec<Comment>,
}

impl AstRoot {
    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.inner_doc.is_empty() && self.trailing_comments.is_empty()
    }
}

/// Structured parser failure. `line`/`column` are 1-based; either may be
/// missing when the parser only produced a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
    /// Offending token text, if the parser knows it
    pub token: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
            token: None,
        }
    }

    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Result of one reparse cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParseOutcome {
    Parsed(AstRoot),
    /// AST of the valid prefix plus the failure that ended it
    PartialParsed(AstRoot, ParseError),
    Failed(ParseError),
    #[default]
    Empty,
}

impl ParseOutcome {
    pub fn ast(&self) -> Option<&AstRoot> {
        match self {
            ParseOutcome::Parsed(ast) | ParseOutcome::PartialParsed(ast, _) => Some(ast),
            ParseOutcome::Failed(_) | ParseOutcome::Empty => None,
        }
    }

    pub fn error(&self) -> Option<&ParseError> {
        match self {
            ParseOutcome::PartialParsed(_, err) | ParseOutcome::Failed(err) => Some(err),
            ParseOutcome::Parsed(_) | ParseOutcome::Empty => None,
        }
    }

    /// First line the AST can no longer vouch for (the failure line).
    /// `None` means the AST, if any, covers every line.
    pub fn ast_limit(&self) -> Option<usize> {
        match self {
            ParseOutcome::PartialParsed(_, err) => Some(err.line.unwrap_or(1)),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ParseOutcome::Parsed(_) => "parsed",
            ParseOutcome::PartialParsed(..) => "partial",
            ParseOutcome::Failed(_) => "failed",
            ParseOutcome::Empty => "empty",
        }
    }
}

/// Pure parser boundary: the same text always yields the same outcome.
pub trait Parser {
    fn parse(&self, text: &str) -> ParseOutcome;
}

impl<F> Parser for F
where
    F: Fn(&str) -> ParseOutcome,
{
    fn parse(&self, text: &str) -> ParseOutcome {
        self(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_kind_from_marker() {
        assert_eq!(CommentKind::from_text("// x"), CommentKind::Plain);
        assert_eq!(CommentKind::from_text("/// x"), CommentKind::LeadingDoc);
        assert_eq!(CommentKind::from_text("//! x"), CommentKind::TrailingDoc);
        assert!(CommentKind::LeadingDoc.is_doc());
        assert!(!CommentKind::Plain.is_doc());
    }

    #[test]
    fn test_outcome_accessors() {
        let err = ParseError::at("boom", 3, 1);
        let partial = ParseOutcome::PartialParsed(AstRoot::default(), err.clone());
        assert!(partial.ast().is_some());
        assert_eq!(partial.error(), Some(&err));
        assert_eq!(partial.ast_limit(), Some(3));

        let failed = ParseOutcome::Failed(err);
        assert!(failed.ast().is_none());
        assert_eq!(failed.ast_limit(), None);
        assert!(ParseOutcome::Empty.error().is_none());
    }

    #[test]
    fn test_closure_is_a_parser() {
        let parser = |_: &str| ParseOutcome::Empty;
        assert_eq!(parser.parse("anything"), ParseOutcome::Empty);
    }

    #[test]
    fn test_parse_error_display_is_message() {
        let err = ParseError::new("unexpected thing").with_token("}");
        assert_eq!(err.to_string(), "unexpected thing");
        assert_eq!(err.token.as_deref(), Some("}"));
    }
}
