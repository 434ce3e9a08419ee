//! Command types for the Elm-style architecture
//!
//! Commands are notifications the host acts on after an update.

use crate::syntax::ErrorRecord;

/// Commands returned by update functions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// The error list differs from the previous cycle
    ErrorsChanged(Vec<ErrorRecord>),
    /// Re-run the highlight pass over every line
    Rehighlight,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands, collapsing trivial cases
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }

    /// Check if this command asks the host for a highlight pass
    pub fn needs_rehighlight(&self) -> bool {
        match self {
            Cmd::None | Cmd::ErrorsChanged(_) => false,
            Cmd::Rehighlight => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_rehighlight()),
        }
    }

    /// The published error list, if this command carries one
    pub fn errors(&self) -> Option<&[ErrorRecord]> {
        match self {
            Cmd::ErrorsChanged(errors) => Some(errors),
            Cmd::Batch(cmds) => cmds.iter().find_map(|c| c.errors()),
            Cmd::None | Cmd::Rehighlight => None,
        }
    }
}

impl From<Option<Cmd>> for Cmd {
    fn from(opt: Option<Cmd>) -> Self {
        opt.unwrap_or(Cmd::None)
    }
}
