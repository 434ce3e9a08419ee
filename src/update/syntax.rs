//! Edit and timer handlers

use std::time::Instant;

use crate::commands::Cmd;
use crate::syntax::{HighlightEngine, HostEditor, Parser};

/// Scheduler-facing events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxEvent {
    Attached,
    Edited {
        position: usize,
        removed: usize,
        added: usize,
    },
    Tick,
}

/// Handle edits, attachment and timer ticks
pub fn update_syntax<P, H>(
    engine: &mut HighlightEngine<P>,
    host: &H,
    event: SyntaxEvent,
    now: Instant,
) -> Option<Cmd>
where
    P: Parser,
    H: HostEditor + ?Sized,
{
    match event {
        SyntaxEvent::Attached => {
            engine.attach(now);
            None
        }

        SyntaxEvent::Edited {
            position,
            removed,
            added,
        } => {
            let revision = host.revision();
            tracing::trace!(
                "contents changed at {} (-{} +{}), rev {}",
                position,
                removed,
                added,
                revision
            );
            engine.on_edit(revision, now);
            None
        }

        SyntaxEvent::Tick => engine.tick(host, now),
    }
}
