//! Message types for the Elm-style architecture
//!
//! Everything the host tells the engine flows through these types.

/// Runtime configuration changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMsg {
    /// Show or hide error overlays (and `ErrorsChanged` publishing)
    SetErrorHighlighting(bool),
    /// Debounce window in milliseconds for the diagnostics parse
    SetParseDelay(u64),
    /// Gate the debounced diagnostics parse
    SetAutoParse(bool),
}

/// Top-level message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    /// The buffer changed at char `position`
    ContentsChanged {
        position: usize,
        removed: usize,
        added: usize,
    },
    /// The engine was bound to a document
    Attached,
    /// Timer tick; due parses run
    Tick,
    Config(ConfigMsg),
}

// Convenience constructors for common messages
impl Msg {
    pub fn set_error_highlighting(enabled: bool) -> Self {
        Msg::Config(ConfigMsg::SetErrorHighlighting(enabled))
    }

    pub fn set_parse_delay(delay_ms: u64) -> Self {
        Msg::Config(ConfigMsg::SetParseDelay(delay_ms))
    }

    pub fn set_auto_parse(enabled: bool) -> Self {
        Msg::Config(ConfigMsg::SetAutoParse(enabled))
    }
}
