//! CLI argument parsing with clap

use crate::config::{Config, ConflictPolicy, ErrorPolicy};
use clap::Parser;
use std::path::PathBuf;

/// media-shelf - file pictures and videos by owner and date
///
/// Moves every picture and video found under the source directory to
/// <destination>/<pictures|videos>/<person>/<year>/<month>/<file>,
/// using the file's modification time. Other files are left alone.
#[derive(Parser, Debug)]
#[command(name = "media-shelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Directory to scan recursively for media files
    #[arg(short, long = "src", visible_alias = "source")]
    pub src: Option<PathBuf>,

    /// Root directory of the organized tree
    #[arg(short, long = "dst", visible_alias = "destination")]
    pub dst: Option<PathBuf>,

    /// Owner label used as a folder name
    #[arg(short, long)]
    pub person: Option<String>,

    /// What to do when the destination file already exists
    #[arg(long, value_enum)]
    pub on_conflict: Option<ConflictPolicy>,

    /// Stop at the first file that cannot be moved
    #[arg(long)]
    pub fail_fast: bool,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Also write a log file into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub sample_config: bool,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref src) = self.src {
            config.source = src.clone();
        }
        if let Some(ref dst) = self.dst {
            config.destination = dst.clone();
        }
        if let Some(ref person) = self.person {
            config.person = person.clone();
        }
        if let Some(policy) = self.on_conflict {
            config.on_conflict = policy;
        }
        if self.fail_fast {
            config.on_error = ErrorPolicy::Abort;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
