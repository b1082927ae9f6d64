//! media-shelf - file pictures and videos by owner and date
//!
//! Exit codes: 0 on success, 1 on a fatal error (bad configuration,
//! unreadable source, `--fail-fast` abort), 2 when the run finished but
//! some files could not be moved.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use media_shelf::{Cli, Config, Processor, ProcessingStatus};
use std::fs::File;
use std::path::Path;
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Exit code when the run completed with per-file failures
const EXIT_PARTIAL_FAILURE: i32 = 2;

// CLI Output Module
mod cli_output {
    //! Coloured summary output for the terminal

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colours
    pub struct CliTheme;

    impl CliTheme {
        /// Moved files
        pub const SUCCESS: Color = Color::Green;
        /// Skipped conflicts, dry-run notice
        pub const WARNING: Color = Color::Yellow;
        /// Failed files
        pub const ERROR: Color = Color::Red;
        /// Labels and secondary text
        pub const HINT: Color = Color::DarkGrey;
        /// Planned moves
        pub const ACCENT: Color = Color::Cyan;
    }

    /// Print a horizontal rule
    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    /// Print a bold title centred over the separator width
    pub fn print_title(title: &str) {
        let padding = 60usize.saturating_sub(title.len()) / 2;
        let _ = stdout().execute(Print(" ".repeat(padding)));
        let _ = stdout().execute(Print(style(title).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print a warning line
    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print an error line
    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print one `key: value` statistic
    pub fn print_stat(key: &str, value: usize, color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value.to_string()).with(color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// One line per file: icon, source, then destination or message
    pub fn print_result(icon: &str, color: Color, source: &str, detail: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(icon).with(color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(detail).with(CliTheme::HINT)));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print where the log file was written
    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print(style("  Log file: ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample_config {
        print!("{}", Config::sample_config());
        return Ok(());
    }

    let log_path = cli
        .log_dir
        .as_ref()
        .map(|dir| dir.join(format!("Run_{}.log", Local::now().format("%Y%m%d_%H%M%S"))));
    let guard = setup_logging(&cli, log_path.as_deref());
    let log_path = log_path.filter(|_| guard.is_some());

    info!(version = env!("CARGO_PKG_VERSION"), "media-shelf starting");

    let config = load_config(&cli)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    let mut processor = Processor::new(config).context("Cannot start processing")?;

    let results = match processor.run() {
        Ok(results) => results,
        Err(e) => {
            error!(error = %e, "Processing aborted");
            drop(guard);
            return Err(e).context("Processing aborted");
        }
    };

    print_summary(&processor, &results, cli.verbose || processor.config().verbose);
    if let Some(ref log_path) = log_path {
        cli_output::print_log_path(&log_path.display().to_string());
    }
    info!("Processing complete");

    let failed = processor.stats().failed;
    drop(guard);
    if failed > 0 {
        std::process::exit(EXIT_PARTIAL_FAILURE);
    }

    Ok(())
}

fn print_summary(processor: &Processor, results: &[media_shelf::FileResult], verbose: bool) {
    use cli_output::*;

    let stats = processor.stats();

    print_separator();
    print_title("Processing complete");
    print_separator();
    print_stat("Discovered", stats.discovered, CliTheme::HINT);
    print_stat("Moved", stats.moved, CliTheme::SUCCESS);
    if processor.config().dry_run {
        print_stat("Planned", stats.planned, CliTheme::ACCENT);
    }
    print_stat("Not media", stats.unclassified, CliTheme::HINT);
    print_stat("Already in place", stats.in_place, CliTheme::HINT);
    print_stat("Conflicts skipped", stats.conflicts, CliTheme::WARNING);
    print_stat("Failed", stats.failed, CliTheme::ERROR);

    for result in results {
        let source = result.source.display().to_string();
        let dest = result
            .destination
            .as_ref()
            .map(|p| format!("→ {}", p.display()))
            .unwrap_or_default();

        match result.status {
            ProcessingStatus::Moved if verbose => {
                print_result("✓", CliTheme::SUCCESS, &source, &dest)
            }
            ProcessingStatus::Planned => print_result("~", CliTheme::ACCENT, &source, &dest),
            ProcessingStatus::ConflictSkipped => {
                print_result("⊘", CliTheme::WARNING, &source, &format!("exists {}", dest))
            }
            ProcessingStatus::Failed => print_result(
                "✗",
                CliTheme::ERROR,
                &source,
                result.error.as_deref().unwrap_or("unknown error"),
            ),
            _ => {}
        }
    }

    if stats.failed > 0 {
        print_separator();
        print_error(&format!("{} file(s) could not be moved", stats.failed));
    }

    if processor.config().dry_run {
        print_separator();
        print_warning("Dry run: no files were moved");
    }
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        info!(config_file = %config_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(config_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    config.validate()?;
    Ok(config)
}

/// Setup logging: stderr always, plus a file when `log_path` is given.
///
/// A log file that cannot be opened is reported and skipped; it never
/// stops the run. Returns the file writer's guard when one is active.
fn setup_logging(cli: &Cli, log_path: Option<&Path>) -> Option<WorkerGuard> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (file, open_error) = match log_path.map(open_log_file).transpose() {
        Ok(file) => (file, None),
        Err(e) => (None, Some(e)),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let guard = match file {
        Some(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            if cli.json_log {
                subscriber
                    .with(
                        fmt::layer()
                            .json()
                            .with_ansi(false)
                            .with_writer(non_blocking),
                    )
                    .init();
            } else {
                subscriber
                    .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
                    .init();
            }
            Some(guard)
        }
        None => {
            subscriber.init();
            None
        }
    };

    if let Some(e) = open_error {
        warn!(error = %format!("{e:#}"), "Log file unavailable, logging to stderr only");
    }

    guard
}

/// Create the log directory and open a fresh log file in it
fn open_log_file(log_path: &Path) -> Result<File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .with_context(|| format!("Cannot open log file {}", log_path.display()))
}
