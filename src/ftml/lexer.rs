//! FTML tokens
//!
//! Tokenization is handled by logos; this module adds 1-based line/column
//! positions on top of the byte spans.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    #[token("\n")]
    Newline,

    #[token("=")]
    Equals,
    #[token(",")]
    Comma,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    String,

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    /// `//`, `///` and `//!` comments; the kind is decided from the text
    #[regex(r"//[^\n]*")]
    Comment,
}

impl Token {
    /// Human-readable name used in error messages
    pub fn describe(self) -> &'static str {
        match self {
            Token::Newline => "end of line",
            Token::Equals => "'='",
            Token::Comma => "','",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::True | Token::False => "boolean",
            Token::Null => "null",
            Token::Ident => "identifier",
            Token::String => "string",
            Token::Number => "number",
            Token::Comment => "comment",
        }
    }
}

/// A token with its source text and 1-based position. `token` is `Err` for
/// input logos could not match (stray characters, unterminated strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub token: Result<Token, ()>,
    pub text: &'a str,
    pub line: usize,
    pub column: usize,
}

/// Tokenize `source`, attaching line/column positions
pub fn tokenize(source: &str) -> Vec<Lexeme<'_>> {
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();
    let mut cursor = Cursor::default();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = cursor.advance_to(source, span.start);
        lexemes.push(Lexeme {
            token: result,
            text: lexer.slice(),
            line,
            column,
        });
    }

    lexemes
}

/// Position just past the last character of `source`
pub fn end_position(source: &str) -> (usize, usize) {
    Cursor::default().advance_to(source, source.len())
}

/// Incremental byte offset → (line, column) conversion
#[derive(Debug)]
struct Cursor {
    offset: usize,
    line: usize,
    line_start: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            line_start: 0,
        }
    }
}

impl Cursor {
    fn advance_to(&mut self, source: &str, target: usize) -> (usize, usize) {
        for (i, b) in source.as_bytes()[self.offset..target].iter().enumerate() {
            if *b == b'\n' {
                self.line += 1;
                self.line_start = self.offset + i + 1;
            }
        }
        self.offset = target;
        let column = source[self.line_start..target].chars().count() + 1;
        (self.line, column)
    }
}
