//! ftml-highlight - highlight an FTML document in the terminal

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser as _;

use ftml_highlight::cli::{CliArgs, OutputFormat};
use ftml_highlight::render::{ansi_document, JsonReport};
use ftml_highlight::syntax::scheduler::INITIAL_PARSE_DELAY_MS;
use ftml_highlight::{theme, update, Cmd, Document, FtmlParser, HighlightEngine, HighlighterConfig, Msg};

fn main() -> Result<()> {
    ftml_highlight::tracing::init();

    let args = CliArgs::parse();
    let run = args.into_config(HighlighterConfig::load());

    let mut doc = Document::from_file(&run.file)
        .with_context(|| format!("Failed to open {}", run.file.display()))?;
    let theme = theme::load_theme_or_default(&run.highlighter.theme);
    let background = theme.background;
    let mut engine = HighlightEngine::with_config(FtmlParser, theme, &run.highlighter);

    // Drive the engine on a virtual clock: attach, then tick at the
    // first-paint deadline.
    let start = Instant::now();
    update(&mut engine, &doc, Msg::Attached, start);
    let due = engine
        .next_deadline()
        .unwrap_or(start + Duration::from_millis(INITIAL_PARSE_DELAY_MS));
    let cmd = Cmd::from(update(&mut engine, &doc, Msg::Tick, due));

    if cmd.needs_rehighlight() {
        let painted = engine.highlight_pass(&mut doc);
        tracing::debug!("painted {} line(s)", painted);
    }

    let path = run.file.display();
    if run.check || engine.error_highlighting() {
        for e in engine.errors() {
            eprintln!("{}:{}:{}: {}", path, e.line, e.column, e.message);
        }
    }

    if run.check {
        if engine.errors().is_empty() {
            return Ok(());
        }
        std::process::exit(1);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run.format {
        OutputFormat::Ansi => {
            let text = ansi_document(&doc, |c| engine.style(c), background);
            writeln!(out, "{}", text)?;
        }
        OutputFormat::Json => {
            let report = JsonReport::new(&doc, engine.snapshot());
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    Ok(())
}
