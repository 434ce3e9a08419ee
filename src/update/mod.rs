//! Update functions for the Elm-style architecture
//!
//! All engine state transitions flow through [`update`].

mod config;
mod syntax;

use std::time::Instant;

use crate::commands::Cmd;
use crate::messages::Msg;
use crate::syntax::{HighlightEngine, HostEditor, Parser};

pub use config::update_config;
pub use syntax::{update_syntax, SyntaxEvent};

/// Main update function - dispatches to sub-handlers
///
/// `now` comes from the host so timer behaviour is deterministic.
pub fn update<P, H>(
    engine: &mut HighlightEngine<P>,
    host: &H,
    msg: Msg,
    now: Instant,
) -> Option<Cmd>
where
    P: Parser,
    H: HostEditor + ?Sized,
{
    match msg {
        Msg::ContentsChanged {
            position,
            removed,
            added,
        } => update_syntax(
            engine,
            host,
            SyntaxEvent::Edited {
                position,
                removed,
                added,
            },
            now,
        ),
        Msg::Attached => update_syntax(engine, host, SyntaxEvent::Attached, now),
        Msg::Tick => update_syntax(engine, host, SyntaxEvent::Tick, now),
        Msg::Config(m) => update_config(engine, host, m, now),
    }
}
