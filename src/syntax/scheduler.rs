//! Reparse scheduling
//!
//! Two timers feed the parser:
//!
//! ```text
//! attach ──(100ms, once)──────────────────────────────▶ Initial
//! edit ───(parse delay, last edit wins)───────────────▶ Diagnostics
//! edit ───(10ms, only while auto-parse is off)────────▶ SyntaxOnly
//! ```
//!
//! The edit-driven slot holds at most one task; every edit replaces it. The
//! first-paint timer lives in its own slot so a burst of edits right after
//! attaching cannot starve the first paint.

use std::time::{Duration, Instant};

/// Default debounce window for the diagnostics path
pub const DEFAULT_PARSE_DELAY_MS: u64 = 500;

/// Delay of the one-shot parse after attaching to a document
pub const INITIAL_PARSE_DELAY_MS: u64 = 100;

/// Delay of the cosmetic refresh while diagnostics are disabled
pub const SYNTAX_ONLY_DELAY_MS: u64 = 10;

/// Lower bound applied to any configured parse delay
pub const MIN_PARSE_DELAY_MS: u64 = 100;

/// What a due parse is expected to refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    /// First paint after attaching; refreshes outcome and errors
    Initial,
    /// Debounced full parse; refreshes outcome and errors
    Diagnostics,
    /// Cosmetic refresh; the error list is left untouched
    SyntaxOnly,
}

impl ParseKind {
    pub fn updates_errors(self) -> bool {
        !matches!(self, ParseKind::SyntaxOnly)
    }
}

/// The edit-driven task currently armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingParse {
    pub kind: ParseKind,
    /// Document revision at the time the task was armed
    pub revision: u64,
    pub due: Instant,
}

/// A parse whose timer has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueParse {
    pub kind: ParseKind,
    /// Revision stamped at schedule time; `None` for the first-paint parse,
    /// which always reads the current content.
    pub revision: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ReparseScheduler {
    parse_delay: Duration,
    auto_parse: bool,
    initial_due: Option<Instant>,
    pending: Option<PendingParse>,
}

impl Default for ReparseScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PARSE_DELAY_MS, true)
    }
}

impl ReparseScheduler {
    pub fn new(parse_delay_ms: u64, auto_parse: bool) -> Self {
        Self {
            parse_delay: Duration::from_millis(clamp_parse_delay(parse_delay_ms)),
            auto_parse,
            initial_due: None,
            pending: None,
        }
    }

    pub fn parse_delay(&self) -> Duration {
        self.parse_delay
    }

    pub fn auto_parse(&self) -> bool {
        self.auto_parse
    }

    pub fn pending(&self) -> Option<&PendingParse> {
        self.pending.as_ref()
    }

    pub fn initial_pending(&self) -> bool {
        self.initial_due.is_some()
    }

    /// Arm the one-shot first-paint parse
    pub fn attach(&mut self, now: Instant) {
        let due = now + Duration::from_millis(INITIAL_PARSE_DELAY_MS);
        tracing::debug!("scheduler: initial parse armed");
        self.initial_due = Some(due);
    }

    /// Replace the outstanding edit-driven task
    pub fn on_edit(&mut self, revision: u64, now: Instant) {
        let (kind, delay) = if self.auto_parse {
            (ParseKind::Diagnostics, self.parse_delay)
        } else {
            (
                ParseKind::SyntaxOnly,
                Duration::from_millis(SYNTAX_ONLY_DELAY_MS),
            )
        };

        if let Some(prev) = self.pending.replace(PendingParse {
            kind,
            revision,
            due: now + delay,
        }) {
            tracing::trace!(
                "scheduler: {:?} for rev {} superseded by rev {}",
                prev.kind,
                prev.revision,
                revision
            );
        }
        tracing::debug!(
            "scheduler: {:?} parse for rev {} in {}ms",
            kind,
            revision,
            delay.as_millis()
        );
    }

    /// Enabling arms a diagnostics parse; disabling cancels a pending one.
    pub fn set_auto_parse(&mut self, enabled: bool, revision: u64, now: Instant) {
        if self.auto_parse == enabled {
            return;
        }
        self.auto_parse = enabled;

        if enabled {
            self.pending = Some(PendingParse {
                kind: ParseKind::Diagnostics,
                revision,
                due: now + self.parse_delay,
            });
        } else if matches!(
            self.pending,
            Some(PendingParse {
                kind: ParseKind::Diagnostics,
                ..
            })
        ) {
            tracing::debug!("scheduler: auto-parse disabled, pending diagnostics cancelled");
            self.pending = None;
        }
    }

    /// Set the debounce window (clamped to the minimum). A pending
    /// diagnostics task restarts with the new window. Returns the applied
    /// delay in milliseconds.
    pub fn set_parse_delay(&mut self, delay_ms: u64, now: Instant) -> u64 {
        let applied = clamp_parse_delay(delay_ms);
        if applied != delay_ms {
            tracing::warn!(
                "parse delay {}ms below minimum, using {}ms",
                delay_ms,
                applied
            );
        }
        self.parse_delay = Duration::from_millis(applied);

        if let Some(pending) = self.pending.as_mut() {
            if pending.kind == ParseKind::Diagnostics {
                pending.due = now + self.parse_delay;
            }
        }
        applied
    }

    /// Earliest instant at which `take_due` will return something
    pub fn next_deadline(&self) -> Option<Instant> {
        let pending = self.pending.map(|p| p.due);
        match (self.initial_due, pending) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Pop every task whose timer has elapsed, folded into one parse.
    ///
    /// When the first-paint timer and an edit-driven task fall due together
    /// a single parse runs; it refreshes errors unless both were cosmetic.
    pub fn take_due(&mut self, now: Instant) -> Option<DueParse> {
        let initial = self.initial_due.filter(|due| *due <= now);
        let pending = self.pending.filter(|p| p.due <= now);

        if initial.is_some() {
            self.initial_due = None;
        }
        if pending.is_some() {
            self.pending = None;
        }

        match (initial, pending) {
            (None, None) => None,
            (Some(_), None) => Some(DueParse {
                kind: ParseKind::Initial,
                revision: None,
            }),
            (None, Some(p)) => Some(DueParse {
                kind: p.kind,
                revision: Some(p.revision),
            }),
            (Some(_), Some(p)) => Some(DueParse {
                kind: if p.kind.updates_errors() {
                    p.kind
                } else {
                    ParseKind::Initial
                },
                revision: Some(p.revision),
            }),
        }
    }
}

pub fn clamp_parse_delay(delay_ms: u64) -> u64 {
    delay_ms.max(MIN_PARSE_DELAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_rapid_edits_coalesce() {
        let t0 = Instant::now();
        let mut sched = ReparseScheduler::default();

        sched.on_edit(1, t0);
        sched.on_edit(2, t0 + ms(50));

        assert_eq!(sched.next_deadline(), Some(t0 + ms(550)));
        assert_eq!(sched.take_due(t0 + ms(500)), None);

        let due = sched.take_due(t0 + ms(550));
        assert_eq!(
            due,
            Some(DueParse {
                kind: ParseKind::Diagnostics,
                revision: Some(2)
            })
        );
        assert_eq!(sched.take_due(t0 + ms(2000)), None);
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn test_initial_parse_is_independent_of_edits() {
        let t0 = Instant::now();
        let mut sched = ReparseScheduler::default();
        sched.attach(t0);
        sched.on_edit(1, t0 + ms(20));

        let first = sched.take_due(t0 + ms(100));
        assert_eq!(first.map(|d| d.kind), Some(ParseKind::Initial));
        assert!(sched.pending().is_some());
        assert_eq!(sched.next_deadline(), Some(t0 + ms(520)));
    }

    #[test]
    fn test_syntax_only_when_auto_parse_disabled() {
        let t0 = Instant::now();
        let mut sched = ReparseScheduler::new(500, false);
        sched.on_edit(3, t0);
        let due = sched.take_due(t0 + ms(SYNTAX_ONLY_DELAY_MS));
        assert_eq!(due.map(|d| d.kind), Some(ParseKind::SyntaxOnly));
        assert!(!ParseKind::SyntaxOnly.updates_errors());
    }

    #[test]
    fn test_toggle_auto_parse() {
        let t0 = Instant::now();
        let mut sched = ReparseScheduler::default();
        sched.on_edit(1, t0);
        sched.set_auto_parse(false, 1, t0);
        assert!(sched.pending().is_none());

        sched.set_auto_parse(true, 1, t0 + ms(10));
        assert_eq!(
            sched.pending().map(|p| (p.kind, p.due)),
            Some((ParseKind::Diagnostics, t0 + ms(510)))
        );
    }

    #[test]
    fn test_parse_delay_floor() {
        let t0 = Instant::now();
        let mut sched = ReparseScheduler::new(10, true);
        assert_eq!(sched.parse_delay(), ms(MIN_PARSE_DELAY_MS));
        assert_eq!(sched.set_parse_delay(50, t0), MIN_PARSE_DELAY_MS);
        assert_eq!(sched.set_parse_delay(800, t0), 800);
    }

    #[test]
    fn test_parse_delay_change_restarts_pending() {
        let t0 = Instant::now();
        let mut sched = ReparseScheduler::default();
        sched.on_edit(1, t0);
        sched.set_parse_delay(200, t0 + ms(100));
        assert_eq!(sched.next_deadline(), Some(t0 + ms(300)));
    }

    #[test]
    fn test_coinciding_timers_fold_into_one_parse() {
        let t0 = Instant::now();
        let mut sched = ReparseScheduler::new(500, false);
        sched.attach(t0);
        sched.on_edit(4, t0 + ms(95));

        let due = sched.take_due(t0 + ms(200));
        assert_eq!(
            due,
            Some(DueParse {
                kind: ParseKind::Initial,
                revision: Some(4)
            })
        );
        assert_eq!(sched.take_due(t0 + ms(300)), None);
    }
}
