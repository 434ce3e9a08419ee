//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use ftml_highlight::syntax::{HostEditor, ParseOutcome, Parser, PlainStyles, StyleCategory};
use ftml_highlight::{update, Cmd, Document, FtmlParser, HighlightEngine, HighlighterConfig, Msg};

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Wraps the reference parser and records every text it is handed
#[derive(Debug, Clone, Default)]
pub struct RecordingParser {
    pub seen: Rc<RefCell<Vec<String>>>,
}

impl RecordingParser {
    pub fn calls(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn last(&self) -> Option<String> {
        self.seen.borrow().last().cloned()
    }
}

impl Parser for RecordingParser {
    fn parse(&self, text: &str) -> ParseOutcome {
        self.seen.borrow_mut().push(text.to_string());
        FtmlParser.parse(text)
    }
}

/// Test harness: an engine bound to a document on a virtual clock
pub struct Harness<P: Parser> {
    pub engine: HighlightEngine<P>,
    pub doc: Document,
    pub now: Instant,
}

impl<P: Parser> Harness<P> {
    pub fn with_parser(parser: P, text: &str, config: &HighlighterConfig) -> Self {
        Self {
            engine: HighlightEngine::with_config(parser, PlainStyles, config),
            doc: Document::with_text(text),
            now: Instant::now(),
        }
    }

    /// Deliver a message at the current virtual time; run a pass if asked
    pub fn send(&mut self, msg: Msg) -> Cmd {
        let cmd = Cmd::from(update(&mut self.engine, &self.doc, msg, self.now));
        if cmd.needs_rehighlight() {
            self.engine.highlight_pass(&mut self.doc);
        }
        cmd
    }

    /// Move the clock forward and tick
    pub fn advance(&mut self, by: Duration) -> Cmd {
        self.now += by;
        self.send(Msg::Tick)
    }

    /// Attach and run the first-paint parse
    pub fn attach(&mut self) -> Cmd {
        self.send(Msg::Attached);
        self.advance(ms(100))
    }

    pub fn insert(&mut self, char_idx: usize, text: &str) -> Cmd {
        let msg = self.doc.insert(char_idx, text);
        self.send(msg)
    }

    pub fn set_text(&mut self, text: &str) -> Cmd {
        let msg = self.doc.set_text(text);
        self.send(msg)
    }

    /// Text covered by spans of `category` on a 1-based line
    pub fn texts(&self, line_no: usize, category: StyleCategory) -> Vec<String> {
        let line = self.doc.line(line_no).unwrap_or_default();
        self.doc
            .spans(line_no)
            .iter()
            .filter(|s| s.category == category)
            .filter_map(|s| s.text(&line).map(String::from))
            .collect()
    }

    pub fn error_spans(&self, line_no: usize) -> usize {
        self.doc
            .spans(line_no)
            .iter()
            .filter(|s| s.category == StyleCategory::Error)
            .count()
    }
}

/// Harness with the reference parser, attached and painted
pub fn attached(text: &str) -> Harness<FtmlParser> {
    let mut h = Harness::with_parser(FtmlParser, text, &HighlighterConfig::default());
    h.attach();
    h
}

/// Harness with a recording parser, attached and painted
pub fn recording(text: &str) -> (Harness<RecordingParser>, RecordingParser) {
    let parser = RecordingParser::default();
    let mut h = Harness::with_parser(parser.clone(), text, &HighlighterConfig::default());
    h.attach();
    (h, parser)
}
