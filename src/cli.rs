//! Command-line argument parsing
//!
//! Supports:
//! - Highlighting one FTML file to the terminal (ANSI) or as JSON
//! - Overriding theme, parse delay and error display from the config file
//! - A check mode that only reports parse errors

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::HighlighterConfig;

/// Output format for highlighted documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output
    #[default]
    Ansi,
    /// Per-line spans and the error list as JSON
    Json,
}

/// Syntax-highlight an FTML document
#[derive(Parser, Debug)]
#[command(
    name = "ftml-highlight",
    version,
    about = "Syntax-highlight an FTML document"
)]
pub struct CliArgs {
    /// Document to highlight
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Theme id (built-in or from the user themes directory)
    #[arg(long, value_name = "ID")]
    pub theme: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Ansi)]
    pub format: OutputFormat,

    /// Do not underline parse errors
    #[arg(long)]
    pub no_errors: bool,

    /// Only report parse errors; exit non-zero if there are any
    #[arg(long)]
    pub check: bool,

    /// Debounce window for the diagnostics parse, in milliseconds
    #[arg(long, value_name = "MS")]
    pub parse_delay: Option<u64>,
}

/// Settings for one run, after merging CLI args over the config file
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub file: PathBuf,
    pub format: OutputFormat,
    pub check: bool,
    pub highlighter: HighlighterConfig,
}

impl CliArgs {
    /// Apply CLI overrides on top of the loaded config
    pub fn into_config(self, mut highlighter: HighlighterConfig) -> RunConfig {
        if let Some(theme) = self.theme {
            highlighter.theme = theme;
        }
        if let Some(delay) = self.parse_delay {
            highlighter.set_parse_delay(delay);
        }
        if self.no_errors {
            highlighter.error_highlighting = false;
        }

        RunConfig {
            file: self.file,
            format: self.format,
            check: self.check,
            highlighter,
        }
    }
}
