//! Per-line highlight pass
//!
//! Each line is painted in a fixed order:
//!
//! 1. comment spans, always
//! 2. AST spans where the AST is authoritative, fallback spans otherwise
//! 3. error overlays, when error highlighting is on
//!
//! A partial AST only vouches for lines before its failure line; the failure
//! line and everything after it use the fallback lexer.

use super::ast::ParseOutcome;
use super::error_locator::{self, ErrorRecord};
use super::fallback;
use super::highlights::{LineHighlight, LineSpanBuffer, LineState};
use super::mapper;

/// Read-only view of one committed parse cycle
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub outcome: &'a ParseOutcome,
    pub errors: &'a [ErrorRecord],
    pub show_errors: bool,
}

impl<'a> PassContext<'a> {
    /// True if the AST (full or partial) is the source of truth for `line_no`
    pub fn ast_covers(&self, line_no: usize) -> bool {
        self.outcome.ast().is_some() && self.outcome.ast_limit().map_or(true, |limit| line_no < limit)
    }

    /// Highlight a single 1-based line
    pub fn highlight_line(&self, line_no: usize, text: &str) -> LineHighlight {
        let mut buf = LineSpanBuffer::new(text);

        fallback::apply_comments(text, &mut buf);

        match self.outcome.ast() {
            Some(ast) if self.ast_covers(line_no) => mapper::map_line(ast, line_no, text, &mut buf),
            _ => fallback::apply(text, &mut buf),
        }

        if self.show_errors {
            for record in self.errors.iter().filter(|r| r.line == line_no) {
                let (start, len) = error_locator::resolve(record, text);
                buf.overlay_error(start, len);
            }
        }

        let state = if buf.has_errors() {
            LineState::HasError
        } else {
            LineState::Normal
        };
        LineHighlight {
            spans: buf.into_spans(),
            state,
        }
    }
}
