//! Syntax highlighting engine
//!
//! AST-driven highlighting with a pattern fallback for text that does not
//! parse.
//!
//! ## Architecture
//!
//! ```text
//! Msg::ContentsChanged → ReparseScheduler (debounce)
//!                      → Msg::Tick → Parser → ParseOutcome + ErrorRecord
//!                      → Cmd::ErrorsChanged / Cmd::Rehighlight
//!                      → highlight_pass → HostEditor::apply_spans
//! ```

pub mod ast;
pub mod driver;
pub mod engine;
pub mod error_locator;
pub mod fallback;
pub mod highlights;
pub mod mapper;
pub mod scheduler;
pub mod style;

pub use ast::{
    AstNode, AstRoot, Comment, CommentKind, KeyValue, List, Object, ParseError, ParseOutcome,
    Parser, Scalar, ScalarValue, SourcePos,
};
pub use engine::{HighlightEngine, HostEditor, Snapshot};
pub use error_locator::ErrorRecord;
pub use highlights::{HighlightSpan, LineHighlight, LineSpanBuffer, LineState, StyleCategory};
pub use scheduler::{ParseKind, ReparseScheduler};
pub use style::{PlainStyles, RenderStyle, StyleResolver, Underline};
