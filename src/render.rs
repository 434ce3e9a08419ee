//! Output rendering for highlighted documents
//!
//! Turns the spans recorded on a [`Document`] into 24-bit ANSI text or a
//! JSON report.

use serde::Serialize;

use crate::document::Document;
use crate::syntax::{
    ErrorRecord, HostEditor, LineHighlight, LineState, RenderStyle, Snapshot, StyleCategory,
    Underline,
};
use crate::theme::Color;

const RESET: &str = "\x1b[0m";

/// SGR parameters for a style; empty when the style changes nothing
fn sgr_codes(style: &RenderStyle, base: Color) -> Vec<String> {
    let mut codes = Vec::new();
    if style.bold {
        codes.push("1".to_string());
    }
    if style.italic {
        codes.push("3".to_string());
    }
    if let Underline::Wave(c) = style.underline {
        codes.push("4:3".to_string());
        codes.push(format!("58;2;{};{};{}", c.r, c.g, c.b));
    }
    if let Some(c) = style.foreground {
        codes.push(format!("38;2;{};{};{}", c.r, c.g, c.b));
    }
    if let Some(c) = style.background {
        let c = c.blend_over(base);
        codes.push(format!("48;2;{};{};{}", c.r, c.g, c.b));
    }
    codes
}

/// Error overlays keep the token's colour and add underline and wash
fn merge_error(token: RenderStyle, error: RenderStyle) -> RenderStyle {
    RenderStyle {
        foreground: token.foreground.or(error.foreground),
        background: error.background.or(token.background),
        bold: token.bold,
        italic: token.italic,
        underline: error.underline,
    }
}

/// Render one line. `base` is the background translucent colours blend over.
pub fn ansi_line(
    text: &str,
    highlight: &LineHighlight,
    resolve: impl Fn(StyleCategory) -> RenderStyle,
    base: Color,
) -> String {
    let mut cuts: Vec<usize> = vec![0, text.len()];
    for span in &highlight.spans {
        cuts.push(span.start.min(text.len()));
        cuts.push(span.end().min(text.len()));
    }
    cuts.retain(|&i| text.is_char_boundary(i));
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = String::with_capacity(text.len());
    for pair in cuts.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let segment = &text[start..end];

        let token = highlight.category_at(start).map(&resolve).unwrap_or_default();
        let in_error = highlight.errors().any(|e| start < e.end() && e.start < end);
        let style = if in_error {
            merge_error(token, resolve(StyleCategory::Error))
        } else {
            token
        };

        let codes = sgr_codes(&style, base);
        if codes.is_empty() {
            out.push_str(segment);
        } else {
            out.push_str("\x1b[");
            out.push_str(&codes.join(";"));
            out.push('m');
            out.push_str(segment);
            out.push_str(RESET);
        }
    }
    out
}

/// Render every line of `doc` from its last applied highlights
pub fn ansi_document(
    doc: &Document,
    resolve: impl Fn(StyleCategory) -> RenderStyle,
    base: Color,
) -> String {
    let empty = LineHighlight::default();
    (1..=doc.line_count())
        .map(|n| {
            let text = doc.line(n).unwrap_or_default();
            let highlight = doc.line_highlight(n).unwrap_or(&empty);
            ansi_line(&text, highlight, &resolve, base)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Serialize)]
pub struct JsonLine<'a> {
    pub line: usize,
    #[serde(flatten)]
    pub highlight: &'a LineHighlight,
}

/// Machine-readable result of one highlight run
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub file: Option<String>,
    pub outcome: &'static str,
    pub revision: u64,
    pub errors: &'a [ErrorRecord],
    pub lines: Vec<JsonLine<'a>>,
}

impl<'a> JsonReport<'a> {
    pub fn new(doc: &'a Document, snapshot: &'a Snapshot) -> Self {
        static EMPTY: LineHighlight = LineHighlight {
            spans: Vec::new(),
            state: LineState::Normal,
        };
        let lines = (1..=doc.line_count())
            .map(|line| JsonLine {
                line,
                highlight: doc.line_highlight(line).unwrap_or(&EMPTY),
            })
            .collect();

        Self {
            file: doc.file_path.as_ref().map(|p| p.display().to_string()),
            outcome: snapshot.outcome.kind_name(),
            revision: snapshot.revision,
            errors: &snapshot.errors,
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{HighlightSpan, StyleResolver};
    use crate::theme::Theme;

    fn line(spans: Vec<HighlightSpan>) -> LineHighlight {
        LineHighlight {
            spans,
            state: LineState::Normal,
        }
    }

    #[test]
    fn test_unstyled_text_passes_through() {
        let theme = Theme::default_dark();
        let out = ansi_line("a = 1", &line(vec![]), |c| theme.resolve(c), theme.background);
        assert_eq!(out, "a = 1");
    }

    #[test]
    fn test_key_is_bold_and_coloured() {
        let theme = Theme::default_dark();
        let key = theme.syntax.key;
        let out = ansi_line(
            "a = 1",
            &line(vec![HighlightSpan::new(0, 1, StyleCategory::Key)]),
            |c| theme.resolve(c),
            theme.background,
        );
        let expected = format!("\x1b[1;38;2;{};{};{}ma\x1b[0m = 1", key.r, key.g, key.b);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_error_overlay_underlines() {
        let theme = Theme::default_dark();
        let out = ansi_line(
            "x = !",
            &line(vec![
                HighlightSpan::new(0, 1, StyleCategory::Key),
                HighlightSpan::new(4, 1, StyleCategory::Error),
            ]),
            |c| theme.resolve(c),
            theme.background,
        );
        assert!(out.ends_with("!\x1b[0m"));
        assert!(out.contains("4:3"));
        assert_eq!(out.matches("4:3").count(), 1);
    }

    #[test]
    fn test_json_report_lists_every_line() {
        let mut doc = Document::with_text("a = 1\n");
        doc.apply_spans(1, &[HighlightSpan::new(0, 1, StyleCategory::Key)]);
        let snapshot = Snapshot::default();

        let report = JsonReport::new(&doc, &snapshot);
        assert_eq!(report.lines.len(), 2);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "empty");
        assert_eq!(json["lines"][0]["line"], 1);
        assert_eq!(json["lines"][0]["state"], "normal");
        assert_eq!(json["lines"][0]["spans"][0]["start"], 0);
    }
}
