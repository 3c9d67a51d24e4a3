//! mdtab - A tabbed terminal markdown editor with live preview.
//!
//! # Usage
//!
//! ```bash
//! mdtab README.md notes.md
//! mdtab --no-preview --no-cheatsheet
//! mdtab --html README.md > README.html
//! ```

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdtab::app::App;
use mdtab::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use mdtab::perf;
use mdtab::render::{HtmlRenderer, Renderer};

/// A tabbed terminal markdown editor with live preview
#[derive(Parser, Debug)]
#[command(name = "mdtab", version, about, long_about = None)]
struct Cli {
    /// Markdown files to open, one tab each
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Render the files to HTML on stdout and exit
    #[arg(long)]
    html: bool,

    /// Start with the preview pane hidden
    #[arg(long)]
    no_preview: bool,

    /// Do not open the Markdown cheatsheet at startup
    #[arg(long)]
    no_cheatsheet: bool,

    /// Milliseconds typing must pause before the preview re-renders
    #[arg(long, value_name = "MS")]
    preview_delay: Option<u64>,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Write debug logs to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Log lines held back while the TUI owns the terminal, written to stderr
/// once it has been restored.
#[derive(Debug, Clone, Default)]
struct DeferredLog(Arc<Mutex<Vec<u8>>>);

/// Lines past this many held bytes are dropped.
const DEFERRED_LOG_LIMIT: usize = 1 << 20;

impl DeferredLog {
    fn replay(&self) -> io::Result<()> {
        let held = {
            let mut guard = self
                .0
                .lock()
                .map_err(|_| io::Error::other("log buffer poisoned"))?;
            std::mem::take(&mut *guard)
        };
        io::stderr().write_all(&held)
    }
}

impl Write for DeferredLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut held = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?;
        if held.len() + buf.len() <= DEFERRED_LOG_LIMIT {
            held.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Filter for the subscriber: DEBUG with a log file, WARN otherwise, with
/// perf timings let through when `--perf` is on.
fn log_filter(verbose: bool, perf: bool) -> Result<EnvFilter> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    if perf && !verbose {
        filter = filter.add_directive(PERF_DIRECTIVE.parse()?);
    }
    Ok(filter)
}

const PERF_DIRECTIVE: &str = "mdtab::perf=info";

/// Install the subscriber. Without a log file, a TUI run holds its output
/// back until the terminal is restored and gets a [`DeferredLog`] to replay.
fn init_logging(debug_log: Option<&Path>, perf: bool, tui: bool) -> Result<Option<DeferredLog>> {
    let filter = log_filter(debug_log.is_some(), perf)?;
    if let Some(path) = debug_log {
        let file = File::create(path)
            .with_context(|| format!("Failed to create debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
        return Ok(None);
    }
    if tui {
        let deferred = DeferredLog::default();
        let writer = deferred.clone();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(move || writer.clone())
            .init();
        return Ok(Some(deferred));
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(None)
}

fn render_html(files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("--html needs at least one file");
    }
    let renderer = HtmlRenderer::new();
    let mut out = std::io::stdout().lock();
    for file in files {
        let markdown = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        out.write_all(renderer.render(&markdown).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let debug_log = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("MDTAB_DEBUG_LOG").map(PathBuf::from));
    let deferred_log = init_logging(debug_log.as_deref(), effective.perf, !cli.html)?;
    perf::set_enabled(effective.perf);
    tracing::debug!(?effective, global = %global_path.display(), "effective flags");

    if cli.html {
        return render_html(&cli.files);
    }

    let mut app = App::new(cli.files)
        .with_cheatsheet(!effective.no_cheatsheet)
        .with_preview_visible(!effective.no_preview)
        .with_preview_delay(effective.preview_delay());

    let result = app.run().context("Application error");
    if let Some(deferred) = deferred_log {
        deferred.replay()?;
    }
    result
}
