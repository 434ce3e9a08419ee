//! Runtime configuration handlers

use std::time::Instant;

use crate::commands::Cmd;
use crate::messages::ConfigMsg;
use crate::syntax::{HighlightEngine, HostEditor, Parser};

/// Handle configuration messages
pub fn update_config<P, H>(
    engine: &mut HighlightEngine<P>,
    host: &H,
    msg: ConfigMsg,
    now: Instant,
) -> Option<Cmd>
where
    P: Parser,
    H: HostEditor + ?Sized,
{
    match msg {
        ConfigMsg::SetErrorHighlighting(enabled) => engine.set_error_highlighting(enabled),

        ConfigMsg::SetParseDelay(delay_ms) => {
            let applied = engine.set_parse_delay(delay_ms, now);
            tracing::debug!("parse delay set to {}ms", applied);
            None
        }

        ConfigMsg::SetAutoParse(enabled) => {
            engine.set_auto_parse(enabled, host.revision(), now);
            None
        }
    }
}
