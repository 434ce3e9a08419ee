//! FTML highlighter - incremental, AST-driven syntax highlighting
//!
//! This crate provides the highlighting engine, a reference FTML parser and
//! a rope-backed host document, wired together in the Elm Architecture
//! pattern: hosts send [`Msg`]s to [`update`] and act on the returned [`Cmd`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod document;
pub mod ftml;
pub mod messages;
pub mod render;
pub mod syntax;
pub mod theme;
pub mod tracing;
pub mod update;
pub mod util;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::HighlighterConfig;
pub use document::Document;
pub use ftml::FtmlParser;
pub use messages::Msg;
pub use syntax::HighlightEngine;
pub use theme::Theme;
pub use update::update;
