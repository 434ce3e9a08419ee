//! Syntax highlighting data structures
//!
//! Defines style categories, per-line spans and the intermediate buffer a
//! single highlight pass paints into.

use std::ops::Range;

use serde::Serialize;

/// Closed set of presentation categories the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleCategory {
    Key,
    Operator,
    String,
    Number,
    Boolean,
    Null,
    Symbol,
    Comment,
    DocComment,
    Error,
}

impl StyleCategory {
    /// All categories, in declaration order
    pub const ALL: [StyleCategory; 10] = [
        StyleCategory::Key,
        StyleCategory::Operator,
        StyleCategory::String,
        StyleCategory::Number,
        StyleCategory::Boolean,
        StyleCategory::Null,
        StyleCategory::Symbol,
        StyleCategory::Comment,
        StyleCategory::DocComment,
        StyleCategory::Error,
    ];

    /// Theme role name used in the syntax palette
    pub fn role(self) -> &'static str {
        match self {
            StyleCategory::Key => "key",
            StyleCategory::Operator => "operator",
            StyleCategory::String => "string",
            StyleCategory::Number => "number",
            StyleCategory::Boolean => "boolean",
            StyleCategory::Null => "null",
            StyleCategory::Symbol => "symbol",
            StyleCategory::Comment => "comment",
            StyleCategory::DocComment => "docComment",
            StyleCategory::Error => "error",
        }
    }

    pub fn is_comment(self) -> bool {
        matches!(self, StyleCategory::Comment | StyleCategory::DocComment)
    }
}

/// A single highlighted span within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    /// Start offset in bytes within the line text
    pub start: usize,
    /// Length in bytes
    pub len: usize,
    pub category: StyleCategory,
}

impl HighlightSpan {
    pub fn new(start: usize, len: usize, category: StyleCategory) -> Self {
        Self {
            start,
            len,
            category,
        }
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Slice of `text` covered by this span, if it is in bounds
    pub fn text<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.range())
    }
}

/// Per-line block state handed to the host after each pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineState {
    #[default]
    Normal,
    HasError,
}

impl LineState {
    /// Numeric block state (0 = normal, 1 = has error)
    pub fn as_block_state(self) -> i32 {
        match self {
            LineState::Normal => 0,
            LineState::HasError => 1,
        }
    }
}

/// Result of highlighting one line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineHighlight {
    /// Token spans (sorted, non-overlapping) followed by error overlays
    pub spans: Vec<HighlightSpan>,
    pub state: LineState,
}

impl LineHighlight {
    /// Category of the token span covering `offset`, ignoring error overlays
    pub fn category_at(&self, offset: usize) -> Option<StyleCategory> {
        for span in &self.spans {
            if span.category == StyleCategory::Error {
                continue;
            }
            if offset >= span.start && offset < span.end() {
                return Some(span.category);
            }
            if span.start > offset {
                break; // token spans are sorted, no need to continue
            }
        }
        None
    }

    /// Error overlay spans on this line
    pub fn errors(&self) -> impl Iterator<Item = &HighlightSpan> {
        self.spans
            .iter()
            .filter(|s| s.category == StyleCategory::Error)
    }

    /// Spans of the given category
    pub fn of(&self, category: StyleCategory) -> impl Iterator<Item = &HighlightSpan> {
        self.spans.iter().filter(move |s| s.category == category)
    }
}

/// Intermediate per-line paint buffer for a single pass.
///
/// Token rules claim byte ranges first-come-first-served: a claim that
/// overlaps an already claimed byte is rejected whole, so later rules never
/// repaint inside an earlier rule's range (numbers inside strings, commas
/// inside comments). Error spans are kept apart as overlays.
#[derive(Debug, Clone)]
pub struct LineSpanBuffer {
    len: usize,
    cells: Vec<Option<StyleCategory>>,
    overlays: Vec<HighlightSpan>,
}

impl LineSpanBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            len: text.len(),
            cells: vec![None; text.len()],
            overlays: Vec::new(),
        }
    }

    /// Length of the line in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if no byte in `range` has been claimed yet
    pub fn is_free(&self, range: Range<usize>) -> bool {
        range.end <= self.len && self.cells[range].iter().all(Option::is_none)
    }

    /// Category already claimed at `offset`
    pub fn claimed_at(&self, offset: usize) -> Option<StyleCategory> {
        self.cells.get(offset).copied().flatten()
    }

    /// Claim `start..start+len` for `category`; returns false if rejected
    pub fn claim(&mut self, start: usize, len: usize, category: StyleCategory) -> bool {
        if len == 0 || category == StyleCategory::Error {
            return false;
        }
        let range = start..start + len;
        if !self.is_free(range.clone()) {
            return false;
        }
        for cell in &mut self.cells[range] {
            *cell = Some(category);
        }
        true
    }

    /// Layer an error overlay on top of whatever is already claimed
    pub fn overlay_error(&mut self, start: usize, len: usize) {
        if len == 0 || start >= self.len {
            return;
        }
        let len = len.min(self.len - start);
        self.overlays
            .push(HighlightSpan::new(start, len, StyleCategory::Error));
    }

    pub fn has_errors(&self) -> bool {
        !self.overlays.is_empty()
    }

    /// Collapse claims into sorted runs, then append the overlays
    pub fn into_spans(self) -> Vec<HighlightSpan> {
        let mut spans: Vec<HighlightSpan> = Vec::new();
        let mut run: Option<(usize, StyleCategory)> = None;

        for (offset, cell) in self.cells.iter().enumerate() {
            match (run, *cell) {
                (Some((_, current)), Some(category)) if current == category => {}
                (Some((start, current)), next) => {
                    spans.push(HighlightSpan::new(start, offset - start, current));
                    run = next.map(|category| (offset, category));
                }
                (None, next) => {
                    run = next.map(|category| (offset, category));
                }
            }
        }
        if let Some((start, category)) = run {
            spans.push(HighlightSpan::new(start, self.len - start, category));
        }

        spans.extend(self.overlays);
        spans
    }
}
