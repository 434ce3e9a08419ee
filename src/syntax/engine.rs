//! Highlight engine state
//!
//! The engine owns the parser, the scheduler and the last committed parse
//! cycle. The cycle is stored as one [`Snapshot`] and replaced wholesale, so
//! a highlight pass never sees an outcome paired with another cycle's errors.

use std::time::Instant;

use super::ast::{ParseError, ParseOutcome, Parser};
use super::driver::PassContext;
use super::error_locator::{self, ErrorRecord};
use super::highlights::{HighlightSpan, LineHighlight, LineState, StyleCategory};
use super::scheduler::{ParseKind, ReparseScheduler};
use super::style::{RenderStyle, StyleResolver};
use crate::commands::Cmd;
use crate::config::HighlighterConfig;
use crate::util::text::split_lines;

/// What the engine needs from the editor that owns the buffer.
///
/// Line numbers are 1-based.
pub trait HostEditor {
    /// Full buffer contents
    fn current_text(&self) -> String;
    /// Monotonic edit counter (may wrap)
    fn revision(&self) -> u64;
    /// Text of line `line_no` without its line ending, `None` past the end
    fn line(&self, line_no: usize) -> Option<String>;
    fn line_count(&self) -> usize;
    fn apply_spans(&mut self, line_no: usize, spans: &[HighlightSpan]);
    fn set_block_state(&mut self, line_no: usize, state: LineState);
}

/// One committed parse cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub outcome: ParseOutcome,
    pub errors: Vec<ErrorRecord>,
    /// Document revision the outcome was parsed from
    pub revision: u64,
}

pub struct HighlightEngine<P: Parser> {
    parser: P,
    styles: Box<dyn StyleResolver>,
    scheduler: ReparseScheduler,
    snapshot: Snapshot,
    error_highlighting: bool,
    /// Number of parse cycles that reached the parser
    parse_count: u64,
}

impl<P: Parser> HighlightEngine<P> {
    pub fn new(parser: P, styles: impl StyleResolver + 'static) -> Self {
        Self::with_config(parser, styles, &HighlighterConfig::default())
    }

    pub fn with_config(
        parser: P,
        styles: impl StyleResolver + 'static,
        config: &HighlighterConfig,
    ) -> Self {
        Self {
            parser,
            styles: Box::new(styles),
            scheduler: ReparseScheduler::new(config.parse_delay_ms, config.auto_parse_enabled),
            snapshot: Snapshot::default(),
            error_highlighting: config.error_highlighting,
            parse_count: 0,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn outcome(&self) -> &ParseOutcome {
        &self.snapshot.outcome
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.snapshot.errors
    }

    pub fn scheduler(&self) -> &ReparseScheduler {
        &self.scheduler
    }

    pub fn error_highlighting(&self) -> bool {
        self.error_highlighting
    }

    pub fn parse_count(&self) -> u64 {
        self.parse_count
    }

    /// When the host should next deliver `Msg::Tick`
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Rendering attributes for a category, via the injected resolver
    pub fn style(&self, category: StyleCategory) -> RenderStyle {
        self.styles.resolve(category)
    }

    pub(crate) fn attach(&mut self, now: Instant) {
        self.scheduler.attach(now);
    }

    pub(crate) fn on_edit(&mut self, revision: u64, now: Instant) {
        self.scheduler.on_edit(revision, now);
    }

    pub(crate) fn set_parse_delay(&mut self, delay_ms: u64, now: Instant) -> u64 {
        self.scheduler.set_parse_delay(delay_ms, now)
    }

    pub(crate) fn set_auto_parse(&mut self, enabled: bool, revision: u64, now: Instant) {
        self.scheduler.set_auto_parse(enabled, revision, now);
    }

    /// Enabling re-publishes the current errors; both directions repaint.
    pub(crate) fn set_error_highlighting(&mut self, enabled: bool) -> Option<Cmd> {
        if self.error_highlighting == enabled {
            return None;
        }
        self.error_highlighting = enabled;
        tracing::debug!("error highlighting {}", if enabled { "on" } else { "off" });

        if enabled {
            Some(Cmd::batch(vec![
                Cmd::ErrorsChanged(self.snapshot.errors.clone()),
                Cmd::Rehighlight,
            ]))
        } else {
            Some(Cmd::Rehighlight)
        }
    }

    /// Run whatever parse is due at `now` and commit its result
    pub(crate) fn tick<H: HostEditor + ?Sized>(&mut self, host: &H, now: Instant) -> Option<Cmd> {
        let due = self.scheduler.take_due(now)?;
        let current = host.revision();

        if let Some(revision) = due.revision {
            if revision != current {
                tracing::debug!(
                    "Skipping stale parse request: doc revision {} != request revision {}",
                    current,
                    revision
                );
                self.scheduler.on_edit(current, now);
                return None;
            }
        }

        self.parse_now(host, due.kind)
    }

    /// Parse the host's current content immediately, bypassing the timers
    pub fn parse_now<H: HostEditor + ?Sized>(&mut self, host: &H, kind: ParseKind) -> Option<Cmd> {
        let revision = host.revision();
        let text = host.current_text();
        tracing::debug!(
            "{:?} parse started for rev {} ({} bytes)",
            kind,
            revision,
            text.len()
        );
        let outcome = self.run_parser(&text);
        self.commit(kind, revision, outcome)
    }

    fn run_parser(&mut self, text: &str) -> ParseOutcome {
        if text.trim().is_empty() {
            return ParseOutcome::Empty;
        }
        self.parse_count += 1;

        match self.parser.parse(text) {
            ParseOutcome::Failed(err) => self.recover_prefix(text, err),
            outcome => outcome,
        }
    }

    /// Parse the text before the failure to salvage an AST for the lines
    /// above it. The first attempt keeps the failing line up to the error
    /// column; the second keeps only complete lines.
    fn recover_prefix(&self, text: &str, err: ParseError) -> ParseOutcome {
        let record = error_locator::locate(&err);
        let lines = split_lines(text);
        let before = lines[..record.line.saturating_sub(1).min(lines.len())].join("\n");

        let mut attempts = Vec::with_capacity(2);
        if let Some(error_line) = lines.get(record.line.saturating_sub(1)) {
            let cut: String = error_line.chars().take(record.column.saturating_sub(1)).collect();
            if !cut.trim().is_empty() {
                attempts.push(if before.is_empty() {
                    cut
                } else {
                    format!("{}\n{}", before, cut)
                });
            }
        }
        attempts.push(before);

        for prefix in attempts {
            if prefix.trim().is_empty() {
                continue;
            }
            match self.parser.parse(&prefix) {
                ParseOutcome::Parsed(ast) | ParseOutcome::PartialParsed(ast, _) => {
                    tracing::debug!(
                        "recovered partial AST from {} bytes before line {}",
                        prefix.len(),
                        record.line
                    );
                    let err = ParseError {
                        line: Some(record.line),
                        column: Some(record.column),
                        ..err
                    };
                    return ParseOutcome::PartialParsed(ast, err);
                }
                ParseOutcome::Failed(_) | ParseOutcome::Empty => {}
            }
        }
        ParseOutcome::Failed(err)
    }

    fn commit(&mut self, kind: ParseKind, revision: u64, outcome: ParseOutcome) -> Option<Cmd> {
        let mut cmds = Vec::with_capacity(2);
        tracing::debug!("committing {} outcome for rev {}", outcome.kind_name(), revision);

        if kind.updates_errors() {
            let errors: Vec<ErrorRecord> =
                outcome.error().map(error_locator::locate).into_iter().collect();
            let changed = errors != self.snapshot.errors;
            self.snapshot = Snapshot {
                outcome,
                errors,
                revision,
            };

            if changed {
                tracing::info!("errors changed: {} error(s)", self.snapshot.errors.len());
                if self.error_highlighting {
                    cmds.push(Cmd::ErrorsChanged(self.snapshot.errors.clone()));
                }
            }
        } else {
            let errors = std::mem::take(&mut self.snapshot.errors);
            self.snapshot = Snapshot {
                outcome,
                errors,
                revision,
            };
        }

        cmds.push(Cmd::Rehighlight);
        Some(Cmd::batch(cmds))
    }

    fn pass_context(&self) -> PassContext<'_> {
        PassContext {
            outcome: &self.snapshot.outcome,
            errors: &self.snapshot.errors,
            show_errors: self.error_highlighting,
        }
    }

    /// Highlight one 1-based line against the committed snapshot
    pub fn highlight_line(&self, line_no: usize, text: &str) -> LineHighlight {
        self.pass_context().highlight_line(line_no, text)
    }

    /// Re-highlight every line of the host, blank ones included. Lines the
    /// host can no longer produce are skipped. Returns the lines painted.
    pub fn highlight_pass<H: HostEditor + ?Sized>(&self, host: &mut H) -> usize {
        let ctx = self.pass_context();
        let mut painted = 0;

        for line_no in 1..=host.line_count() {
            let Some(text) = host.line(line_no) else {
                tracing::trace!("line {} vanished during pass", line_no);
                continue;
            };
            let highlight = ctx.highlight_line(line_no, &text);
            host.apply_spans(line_no, &highlight.spans);
            host.set_block_state(line_no, highlight.state);
            painted += 1;
        }
        painted
    }
}

impl<P: Parser> std::fmt::Debug for HighlightEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightEngine")
            .field("scheduler", &self.scheduler)
            .field("snapshot", &self.snapshot)
            .field("error_highlighting", &self.error_highlighting)
            .field("parse_count", &self.parse_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::AstRoot;
    use crate::syntax::style::PlainStyles;

    struct Text(String);

    impl HostEditor for Text {
        fn current_text(&self) -> String {
            self.0.clone()
        }
        fn revision(&self) -> u64 {
            0
        }
        fn line(&self, line_no: usize) -> Option<String> {
            self.0.split('\n').nth(line_no.checked_sub(1)?).map(String::from)
        }
        fn line_count(&self) -> usize {
            self.0.split('\n').count()
        }
        fn apply_spans(&mut self, _: usize, _: &[HighlightSpan]) {}
        fn set_block_state(&mut self, _: usize, _: LineState) {}
    }

    /// Accepts any text without `!`; fails at the first `!` otherwise
    fn bang_parser(text: &str) -> ParseOutcome {
        for (i, line) in text.lines().enumerate() {
            if let Some(col) = line.find('!') {
                return ParseOutcome::Failed(
                    ParseError::at("unexpected character", i + 1, col + 1).with_token("!"),
                );
            }
        }
        ParseOutcome::Parsed(AstRoot::default())
    }

    #[test]
    fn test_whitespace_short_circuits() {
        let mut engine = HighlightEngine::new(bang_parser, PlainStyles);
        engine.parse_now(&Text("  \n\t".into()), ParseKind::Diagnostics);
        assert_eq!(engine.outcome(), &ParseOutcome::Empty);
        assert_eq!(engine.parse_count(), 0);
    }

    #[test]
    fn test_failure_recovers_prefix() {
        let mut engine = HighlightEngine::new(bang_parser, PlainStyles);
        let cmd = engine.parse_now(&Text("a = 1\nb = !".into()), ParseKind::Diagnostics);

        assert!(matches!(engine.outcome(), ParseOutcome::PartialParsed(_, e) if e.line == Some(2)));
        assert_eq!(engine.errors().len(), 1);
        assert_eq!(engine.errors()[0].token.as_deref(), Some("!"));
        let cmd = Cmd::from(cmd);
        assert!(cmd.needs_rehighlight());
        assert_eq!(cmd.errors().map(<[ErrorRecord]>::len), Some(1));
    }

    #[test]
    fn test_failure_on_first_column_stays_failed() {
        let mut engine = HighlightEngine::new(bang_parser, PlainStyles);
        engine.parse_now(&Text("!".into()), ParseKind::Diagnostics);
        assert!(matches!(engine.outcome(), ParseOutcome::Failed(_)));
    }

    #[test]
    fn test_unchanged_errors_are_not_republished() {
        let mut engine = HighlightEngine::new(bang_parser, PlainStyles);
        let host = Text("x = !".into());
        engine.parse_now(&host, ParseKind::Diagnostics);
        let again = Cmd::from(engine.parse_now(&host, ParseKind::Diagnostics));
        assert_eq!(again, Cmd::Rehighlight);
    }

    #[test]
    fn test_syntax_only_keeps_error_list() {
        let mut engine = HighlightEngine::new(bang_parser, PlainStyles);
        engine.parse_now(&Text("x = !".into()), ParseKind::Diagnostics);
        engine.parse_now(&Text("x = 1".into()), ParseKind::SyntaxOnly);
        assert!(matches!(engine.outcome(), ParseOutcome::Parsed(_)));
        assert_eq!(engine.errors().len(), 1);
    }

    #[test]
    fn test_toggle_error_highlighting() {
        let mut engine = HighlightEngine::new(bang_parser, PlainStyles);
        engine.parse_now(&Text("x = !".into()), ParseKind::Diagnostics);

        assert_eq!(engine.set_error_highlighting(false), Some(Cmd::Rehighlight));
        assert_eq!(engine.set_error_highlighting(false), None);
        let on = Cmd::from(engine.set_error_highlighting(true));
        assert_eq!(on.errors().map(<[ErrorRecord]>::len), Some(1));
        assert!(on.needs_rehighlight());
    }
}
