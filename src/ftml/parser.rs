//! Recursive-descent FTML parser
//!
//! ```text
//! document := entries EOF
//! entries  := (entry (',' | NEWLINE)*)*
//! entry    := key '=' value COMMENT?
//! key      := IDENT | STRING
//! value    := STRING | NUMBER | 'true' | 'false' | 'null' | object | list
//! object   := '{' entries '}'
//! list     := '[' (value (',' | NEWLINE)*)* ']'
//! ```
//!
//! Failures read `<what> at line L, col C, got `TOKEN`` (or `got end of
//! line` / `got end of input`), with the same line/column in the structured
//! fields.

use indexmap::IndexMap;

use super::lexer::{end_position, tokenize, Lexeme, Token};
use crate::syntax::ast::{
    AstNode, AstRoot, Comment, CommentKind, KeyValue, List, Object, ParseError, ParseOutcome,
    Parser, Scalar, ScalarValue, SourcePos,
};

/// Reference parser for the FTML configuration format
#[derive(Debug, Clone, Copy, Default)]
pub struct FtmlParser;

impl Parser for FtmlParser {
    fn parse(&self, text: &str) -> ParseOutcome {
        match parse_document(text) {
            Ok(root) => ParseOutcome::Parsed(root),
            Err(err) => ParseOutcome::Failed(err),
        }
    }
}

/// Parse a complete document
pub fn parse_document(text: &str) -> Result<AstRoot, ParseError> {
    let mut state = ParserState::new(text);
    let block = state.entries(None)?;
    Ok(AstRoot {
        entries: block.entries,
        inner_doc: block.inner_doc,
        trailing_comments: block.trailing_comments,
    })
}

/// Entries plus the comments that belong to their container
#[derive(Debug, Default)]
struct Block {
    entries: IndexMap<String, KeyValue>,
    inner_doc: Vec<Comment>,
    trailing_comments: Vec<Comment>,
}

struct ParserState<'a> {
    lexemes: Vec<Lexeme<'a>>,
    pos: usize,
    eof: (usize, usize),
}

impl<'a> ParserState<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lexemes: tokenize(text),
            pos: 0,
            eof: end_position(text),
        }
    }

    fn peek(&self) -> Option<&Lexeme<'a>> {
        self.lexemes.get(self.pos)
    }

    fn peek_token(&self) -> Option<Token> {
        self.peek().and_then(|l| l.token.ok())
    }

    fn bump(&mut self) -> Option<Lexeme<'a>> {
        let lexeme = self.lexemes.get(self.pos).copied();
        self.pos += 1;
        lexeme
    }

    /// Error at the current token
    fn error(&self, what: &str) -> ParseError {
        match self.peek() {
            None => {
                let (line, column) = self.eof;
                ParseError::at(
                    format!("{} at line {}, col {}, got end of input", what, line, column),
                    line,
                    column,
                )
            }
            Some(lexeme) if lexeme.token == Ok(Token::Newline) => ParseError::at(
                format!(
                    "{} at line {}, col {}, got end of line",
                    what, lexeme.line, lexeme.column
                ),
                lexeme.line,
                lexeme.column,
            ),
            Some(lexeme) => token_error(what, lexeme),
        }
    }

    fn comment(lexeme: &Lexeme<'_>) -> Comment {
        Comment::new(
            lexeme.text.trim_end(),
            SourcePos::new(lexeme.line, lexeme.column),
        )
    }

    /// Entries until EOF (top level) or the closing brace (object body)
    fn entries(&mut self, closer: Option<Token>) -> Result<Block, ParseError> {
        let mut block = Block::default();
        let mut leading: Vec<Comment> = Vec::new();

        loop {
            match self.peek_token() {
                Some(Token::Newline) | Some(Token::Comma) => {
                    self.bump();
                    continue;
                }
                Some(Token::Comment) => {
                    if let Some(lexeme) = self.bump() {
                        let comment = Self::comment(&lexeme);
                        if comment.kind == CommentKind::TrailingDoc {
                            block.inner_doc.push(comment);
                        } else {
                            leading.push(comment);
                        }
                    }
                    continue;
                }
                None => break,
                Some(token) if Some(token) == closer => break,
                _ => {}
            }

            let mut entry = self.entry()?;
            if let Some(existing) = block.entries.get(&entry.key) {
                tracing::trace!("duplicate key {:?} (first at {:?})", entry.key, existing.pos);
                let line = entry.pos.line;
                let column = entry.pos.column.unwrap_or(1);
                return Err(ParseError::at(
                    format!(
                        "duplicate key at line {}, col {}, got `{}`",
                        line, column, entry.key
                    ),
                    line,
                    column,
                )
                .with_token(entry.key.clone()));
            }
            entry.leading_comments = std::mem::take(&mut leading);

            match self.peek_token() {
                None | Some(Token::Newline) | Some(Token::Comma) => {}
                Some(token) if Some(token) == closer => {}
                _ => {
                    let what = if closer.is_some() {
                        "expected ',' or '}'"
                    } else {
                        "expected ',' or newline"
                    };
                    return Err(self.error(what));
                }
            }
            block.entries.insert(entry.key.clone(), entry);
        }

        block.trailing_comments = leading;
        Ok(block)
    }

    fn entry(&mut self) -> Result<KeyValue, ParseError> {
        let (key, key_lexeme) = match self.peek().copied() {
            Some(lexeme) if lexeme.token == Ok(Token::Ident) => {
                self.bump();
                (lexeme.text.to_string(), lexeme)
            }
            Some(lexeme) if lexeme.token == Ok(Token::String) => {
                self.bump();
                (unquote(lexeme.text), lexeme)
            }
            _ => return Err(self.error("expected key")),
        };

        if self.peek_token() != Some(Token::Equals) {
            return Err(self.error("expected '='"));
        }
        self.bump();

        let value = self.value()?;
        let trailing_comment = self.same_line_comment(&value);

        Ok(KeyValue {
            key,
            value: Box::new(value),
            leading_comments: Vec::new(),
            trailing_comment,
            pos: SourcePos::new(key_lexeme.line, key_lexeme.column),
        })
    }

    /// A comment directly after a value on the line the value ends on
    fn same_line_comment(&mut self, value: &AstNode) -> Option<Comment> {
        let end_line = match value {
            AstNode::Object(o) => o.close.map_or(o.pos.line, |c| c.line),
            AstNode::List(l) => l.close.map_or(l.pos.line, |c| c.line),
            other => other.pos().line,
        };
        match self.peek() {
            Some(lexeme) if lexeme.token == Ok(Token::Comment) && lexeme.line == end_line => {
                let comment = Self::comment(lexeme);
                self.bump();
                Some(comment)
            }
            _ => None,
        }
    }

    fn value(&mut self) -> Result<AstNode, ParseError> {
        let Some(lexeme) = self.peek().copied() else {
            return Err(self.error("expected value"));
        };
        let pos = SourcePos::new(lexeme.line, lexeme.column);

        let value = match lexeme.token {
            Ok(Token::String) => ScalarValue::String(unquote(lexeme.text)),
            Ok(Token::Number) => match lexeme.text.parse::<f64>() {
                Ok(n) => ScalarValue::Number(n),
                Err(_) => return Err(token_error("invalid number", &lexeme)),
            },
            Ok(Token::True) => ScalarValue::Bool(true),
            Ok(Token::False) => ScalarValue::Bool(false),
            Ok(Token::Null) => ScalarValue::Null,
            Ok(Token::LBrace) => return self.object(pos),
            Ok(Token::LBracket) => return self.list(pos),
            _ => return Err(self.error("expected value")),
        };
        self.bump();
        Ok(AstNode::Scalar(Scalar { value, pos }))
    }

    fn object(&mut self, pos: SourcePos) -> Result<AstNode, ParseError> {
        self.bump();
        let block = self.entries(Some(Token::RBrace))?;

        let close = match self.peek().copied() {
            Some(lexeme) if lexeme.token == Ok(Token::RBrace) => {
                self.bump();
                SourcePos::new(lexeme.line, lexeme.column)
            }
            _ => return Err(self.error("expected '}'")),
        };

        Ok(AstNode::Object(Object {
            entries: block.entries,
            inner_doc: block.inner_doc,
            trailing_comments: block.trailing_comments,
            pos,
            close: Some(close),
        }))
    }

    fn list(&mut self, pos: SourcePos) -> Result<AstNode, ParseError> {
        self.bump();
        let mut list = List {
            pos,
            ..Default::default()
        };
        let mut pending: Vec<Comment> = Vec::new();

        loop {
            match self.peek().copied() {
                Some(lexeme) if lexeme.token == Ok(Token::RBracket) => {
                    self.bump();
                    list.trailing_comments = pending;
                    list.close = Some(SourcePos::new(lexeme.line, lexeme.column));
                    return Ok(AstNode::List(list));
                }
                Some(lexeme)
                    if matches!(lexeme.token, Ok(Token::Newline) | Ok(Token::Comma)) =>
                {
                    self.bump();
                }
                Some(lexeme) if lexeme.token == Ok(Token::Comment) => {
                    self.bump();
                    let comment = Self::comment(&lexeme);
                    if comment.kind == CommentKind::TrailingDoc {
                        list.inner_doc.push(comment);
                    } else {
                        pending.push(comment);
                    }
                }
                None => return Err(self.error("expected ']'")),
                Some(_) => {
                    list.elements
                        .extend(pending.drain(..).map(AstNode::Comment));
                    let element = self.value()?;
                    let trailing = self.same_line_comment(&element);
                    list.elements.push(element);
                    list.elements.extend(trailing.map(AstNode::Comment));

                    match self.peek_token() {
                        Some(Token::Comma) | Some(Token::Newline) | Some(Token::RBracket) => {}
                        _ => return Err(self.error("expected ',' or ']'")),
                    }
                }
            }
        }
    }
}

fn token_error(what: &str, lexeme: &Lexeme<'_>) -> ParseError {
    let what = if lexeme.token.is_err() && what.starts_with("expected") {
        "unexpected character"
    } else {
        what
    };
    ParseError::at(
        format!(
            "{} at line {}, col {}, got `{}`",
            what, lexeme.line, lexeme.column, lexeme.text
        ),
        lexeme.line,
        lexeme.column,
    )
    .with_token(lexeme.text)
}

/// Strip quotes and resolve backslash escapes
fn unquote(raw: &str) -> String {
    let inner = raw
        .get(1..raw.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
