//! media-shelf - file pictures and videos into a dated tree
//!
//! This library walks a source directory and moves every picture and
//! video it finds to
//! `<destination>/<pictures|videos>/<person>/<year>/<month>/<file>`:
//! - extension-based classification with a static table
//! - destination folders from the file's modification time
//! - rename with copy+delete fallback, configurable conflict handling
//! - dry-run mode

pub mod category;
pub mod cli;
pub mod config;
pub mod destination;
pub mod error;
pub mod mover;
pub mod process;
pub mod time;
pub mod walker;

pub use category::{Classifier, MediaCategory};
pub use cli::Cli;
pub use config::{Config, ConfigError, ConflictPolicy, ErrorPolicy};
pub use destination::build_destination;
pub use error::{Error, Result};
pub use mover::{MoveOutcome, Mover};
pub use process::{FileRecord, FileResult, ProcessingStats, ProcessingStatus, Processor};
pub use walker::Walker;
