//! Reference host document - a rope buffer that records applied highlights

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use ropey::Rope;

use crate::messages::Msg;
use crate::syntax::{HighlightSpan, HostEditor, LineHighlight, LineState};
use crate::util::file_validation::{read_document, FileOpenError};

/// Text buffer plus the last highlight pass applied to it
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// The text buffer
    pub buffer: Rope,
    /// Path to the file on disk (None for in-memory documents)
    pub file_path: Option<PathBuf>,
    /// Revision counter (incremented on each edit, wraps)
    pub revision: u64,
    /// Spans and block state per 1-based line, as last applied
    highlights: HashMap<usize, LineHighlight>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with initial text
    pub fn with_text(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            ..Default::default()
        }
    }

    /// Load a document from a file path
    pub fn from_file(path: &Path) -> Result<Self, FileOpenError> {
        let content = read_document(path)?;
        Ok(Self {
            buffer: Rope::from(content),
            file_path: Some(path.to_path_buf()),
            ..Default::default()
        })
    }

    /// Insert `text` at char index `char_idx` (clamped to the end)
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Msg {
        let position = char_idx.min(self.buffer.len_chars());
        self.buffer.insert(position, text);
        self.touch();
        Msg::ContentsChanged {
            position,
            removed: 0,
            added: text.chars().count(),
        }
    }

    /// Remove the chars in `range` (clamped to the buffer)
    pub fn remove(&mut self, range: Range<usize>) -> Msg {
        let len = self.buffer.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.buffer.remove(start..end);
        self.touch();
        Msg::ContentsChanged {
            position: start,
            removed: end - start,
            added: 0,
        }
    }

    /// Replace the whole buffer
    pub fn set_text(&mut self, text: &str) -> Msg {
        let removed = self.buffer.len_chars();
        self.buffer = Rope::from(text);
        self.touch();
        Msg::ContentsChanged {
            position: 0,
            removed,
            added: text.chars().count(),
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        // Surviving lines keep their highlights until the next pass
        let lines = self.buffer.len_lines();
        self.highlights.retain(|&line_no, _| line_no <= lines);
    }

    /// Line content without its line ending (0-based index)
    pub fn get_line_cow(&self, line_idx: usize) -> Option<Cow<'_, str>> {
        if line_idx >= self.buffer.len_lines() {
            return None;
        }

        let line = self.buffer.line(line_idx);
        let len = line.len_chars();
        let trim_len = if len > 0 && line.char(len - 1) == '\n' {
            if len > 1 && line.char(len - 2) == '\r' {
                2
            } else {
                1
            }
        } else {
            0
        };

        let trimmed = line.slice(..len - trim_len);
        match trimmed.as_str() {
            Some(s) => Some(Cow::Borrowed(s)),
            None => Some(Cow::Owned(trimmed.to_string())),
        }
    }

    /// Last applied highlight for a 1-based line
    pub fn line_highlight(&self, line_no: usize) -> Option<&LineHighlight> {
        self.highlights.get(&line_no)
    }

    /// Last applied spans for a 1-based line (empty if never painted)
    pub fn spans(&self, line_no: usize) -> &[HighlightSpan] {
        self.highlights
            .get(&line_no)
            .map_or(&[], |h| h.spans.as_slice())
    }

    pub fn block_state(&self, line_no: usize) -> LineState {
        self.highlights
            .get(&line_no)
            .map_or(LineState::Normal, |h| h.state)
    }
}

impl HostEditor for Document {
    fn current_text(&self) -> String {
        self.buffer.to_string()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn line(&self, line_no: usize) -> Option<String> {
        let idx = line_no.checked_sub(1)?;
        self.get_line_cow(idx).map(Cow::into_owned)
    }

    fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    fn apply_spans(&mut self, line_no: usize, spans: &[HighlightSpan]) {
        self.highlights.entry(line_no).or_default().spans = spans.to_vec();
    }

    fn set_block_state(&mut self, line_no: usize, state: LineState) {
        self.highlights.entry(line_no).or_default().state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_bump_revision_and_report_change() {
        let mut doc = Document::with_text("a = 1");
        assert_eq!(doc.revision, 0);

        let msg = doc.insert(5, "0");
        assert_eq!(
            msg,
            Msg::ContentsChanged {
                position: 5,
                removed: 0,
                added: 1
            }
        );
        assert_eq!(doc.current_text(), "a = 10");

        let msg = doc.remove(4..6);
        assert_eq!(
            msg,
            Msg::ContentsChanged {
                position: 4,
                removed: 2,
                added: 0
            }
        );
        assert_eq!(doc.revision, 2);
    }

    #[test]
    fn test_lines_are_one_based_without_endings() {
        let doc = Document::with_text("a = 1\r\nb = 2\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(1).as_deref(), Some("a = 1"));
        assert_eq!(doc.line(2).as_deref(), Some("b = 2"));
        assert_eq!(doc.line(3).as_deref(), Some(""));
        assert_eq!(doc.line(0), None);
        assert_eq!(doc.line(4), None);
    }

    #[test]
    fn test_remove_clamps_range() {
        let mut doc = Document::with_text("abc");
        doc.remove(2..10);
        assert_eq!(doc.current_text(), "ab");
    }

    #[test]
    fn test_applied_highlights_are_recorded() {
        let mut doc = Document::with_text("x");
        let span = HighlightSpan::new(0, 1, crate::syntax::StyleCategory::Key);
        doc.apply_spans(1, &[span]);
        doc.set_block_state(1, LineState::HasError);
        assert_eq!(doc.spans(1), &[span]);
        assert_eq!(doc.block_state(1), LineState::HasError);
        assert!(doc.spans(2).is_empty());
    }

    #[test]
    fn test_deleted_lines_drop_their_highlights() {
        let mut doc = Document::with_text("a\nb\nc");
        let span = HighlightSpan::new(0, 1, crate::syntax::StyleCategory::Key);
        for line_no in 1..=3 {
            doc.apply_spans(line_no, &[span]);
        }
        doc.set_block_state(3, LineState::HasError);

        doc.remove(1..5);
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.spans(1), &[span]);
        assert!(doc.spans(3).is_empty());
        assert!(doc.line_highlight(2).is_none());
        assert_eq!(doc.block_state(3), LineState::Normal);
    }
}
