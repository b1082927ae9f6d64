//! Main file processor
//!
//! Drives the pipeline one file at a time:
//! - Walking the source tree
//! - Classifying each file by extension
//! - Computing its destination from category, person and mtime
//! - Moving it into place

use crate::category::{Classifier, MediaCategory};
use crate::config::{Config, ConfigError, ErrorPolicy};
use crate::destination::build_destination;
use crate::error::{Error, Result};
use crate::mover::{MoveOutcome, Mover};
use crate::time::modification_time;
use crate::walker::Walker;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};

/// A classified source file, alive only while it is being processed
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub source: PathBuf,
    pub modified: DateTime<Local>,
    pub category: MediaCategory,
}

impl FileRecord {
    /// Classify `path` and read its modification time.
    ///
    /// Returns `Ok(None)` for files with an unknown extension; their
    /// metadata is never read.
    pub fn inspect(path: &Path, classifier: &Classifier) -> Result<Option<Self>> {
        let Some(category) = classifier.classify(path) else {
            return Ok(None);
        };

        let metadata = fs::symlink_metadata(path).map_err(|e| Error::Metadata {
            path: path.to_path_buf(),
            source: e,
        })?;
        let modified = modification_time(path, &metadata)?;

        Ok(Some(Self {
            source: path.to_path_buf(),
            modified,
            category,
        }))
    }

    /// Destination under `root` for the given person label
    pub fn destination(&self, root: &Path, person: &str) -> Result<PathBuf> {
        let file_name = self.source.file_name().ok_or_else(|| Error::MissingFileName {
            path: self.source.clone(),
        })?;
        Ok(build_destination(
            root,
            self.category,
            person,
            &self.modified,
            file_name,
        ))
    }
}

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Destination file path (if one was computed)
    pub destination: Option<PathBuf>,
    /// Processing status
    pub status: ProcessingStatus,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl FileResult {
    fn new(source: &Path, destination: Option<PathBuf>, status: ProcessingStatus) -> Self {
        Self {
            source: source.to_path_buf(),
            destination,
            status,
            error: None,
        }
    }

    fn failed(source: &Path, destination: Option<PathBuf>, err: &Error) -> Self {
        Self {
            source: source.to_path_buf(),
            destination,
            status: ProcessingStatus::Failed,
            error: Some(err.to_string()),
        }
    }
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// File was moved into the destination tree
    Moved,
    /// Dry run - would have been moved
    Planned,
    /// Extension not recognized, file left in place
    Unclassified,
    /// Destination taken and the conflict policy said skip
    ConflictSkipped,
    /// File already sits at its destination
    AlreadyInPlace,
    /// Processing failed
    Failed,
}

/// Processing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub discovered: usize,
    pub moved: usize,
    pub planned: usize,
    pub unclassified: usize,
    pub conflicts: usize,
    pub in_place: usize,
    pub failed: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, status: ProcessingStatus) {
        match status {
            ProcessingStatus::Moved => self.moved += 1,
            ProcessingStatus::Planned => self.planned += 1,
            ProcessingStatus::Unclassified => self.unclassified += 1,
            ProcessingStatus::ConflictSkipped => self.conflicts += 1,
            ProcessingStatus::AlreadyInPlace => self.in_place += 1,
            ProcessingStatus::Failed => self.failed += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Discovered: {}, Moved: {}, Planned: {}, Unclassified: {}, Conflicts: {}, In place: {}, Failed: {}",
            self.discovered,
            self.moved,
            self.planned,
            self.unclassified,
            self.conflicts,
            self.in_place,
            self.failed
        )
    }
}

/// Main processor for organizing media files
pub struct Processor {
    config: Config,
    classifier: Classifier,
    /// Canonical source root
    source: PathBuf,
    /// Absolute destination root
    destination: PathBuf,
    stats: ProcessingStats,
}

/// A per-file error together with what is known about the file
struct FileFailure {
    source: PathBuf,
    destination: Option<PathBuf>,
    error: Error,
}

impl Processor {
    /// Create a new processor with the given configuration.
    ///
    /// Fails if the source root is missing or unreadable. Outside dry-run
    /// mode the destination root is created here, so an unwritable
    /// destination fails before any file is touched.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let source = fs::canonicalize(&config.source).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::SourceNotFound {
                path: config.source.clone(),
            },
            _ => Error::SourceUnreadable {
                path: config.source.clone(),
                source: e,
            },
        })?;

        if !config.dry_run {
            fs::create_dir_all(&config.destination).map_err(|e| {
                Error::DestinationCreateFailed {
                    path: config.destination.clone(),
                    source: e,
                }
            })?;
        }

        let destination = resolve_dir(&config.destination)?;
        if destination == source {
            return Err(ConfigError::SameDirectory(source).into());
        }
        let classifier = config.classifier();

        Ok(Self {
            config,
            classifier,
            source,
            destination,
            stats: ProcessingStats::new(),
        })
    }

    /// Run the processing pipeline.
    ///
    /// Returns `Err` if the source root cannot be walked, or on the first
    /// per-file error when the error policy is [`ErrorPolicy::Abort`].
    pub fn run(&mut self) -> Result<Vec<FileResult>> {
        let _span = span!(Level::INFO, "processor_run").entered();

        let mut walker = Walker::new(&self.source)?;
        if self.destination.starts_with(&self.source) {
            debug!(destination = %self.destination.display(), "Destination lies inside source, excluding it");
            walker = walker.exclude(self.destination.clone());
        }

        info!(
            source = %self.source.display(),
            destination = %self.destination.display(),
            person = %self.config.person,
            dry_run = self.config.dry_run,
            "Scanning source directory..."
        );

        let mut mover = Mover::new(self.config.on_conflict, self.config.dry_run);
        let mut results = Vec::new();

        for item in walker {
            self.stats.discovered += 1;

            let outcome = match item {
                Ok(path) => self.process_file(&path, &mut mover),
                // Failing to list the root itself ends the run
                Err(Error::Traversal(e)) if e.depth() == 0 => {
                    return Err(Error::SourceUnreadable {
                        path: self.source.clone(),
                        source: e.into(),
                    });
                }
                Err(error) => Err(FileFailure {
                    source: match &error {
                        Error::Traversal(e) => e.path().map(Path::to_path_buf),
                        _ => None,
                    }
                    .unwrap_or_else(|| self.source.clone()),
                    destination: None,
                    error,
                }),
            };

            let result = match outcome {
                Ok(result) => result,
                Err(failure) => {
                    error!(
                        path = %failure.source.display(),
                        error = %failure.error,
                        "Failed to process file"
                    );

                    if self.config.on_error == ErrorPolicy::Abort {
                        self.stats.record(ProcessingStatus::Failed);
                        info!("{}", self.stats.summary());
                        return Err(failure.error);
                    }

                    FileResult::failed(&failure.source, failure.destination, &failure.error)
                }
            };

            self.stats.record(result.status);
            results.push(result);
        }

        info!("{}", self.stats.summary());
        Ok(results)
    }

    /// Classify, place and move one file
    fn process_file(
        &self,
        path: &Path,
        mover: &mut Mover,
    ) -> std::result::Result<FileResult, FileFailure> {
        let _file_span = span!(Level::DEBUG, "process_file", path = %path.display()).entered();
        let fail = |destination: Option<PathBuf>, error: Error| FileFailure {
            source: path.to_path_buf(),
            destination,
            error,
        };

        let record = match FileRecord::inspect(path, &self.classifier) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Unrecognized extension, leaving file in place");
                return Ok(FileResult::new(path, None, ProcessingStatus::Unclassified));
            }
            Err(e) => return Err(fail(None, e)),
        };

        let dest = record
            .destination(&self.destination, &self.config.person)
            .map_err(|e| fail(None, e))?;

        match mover.relocate(&record.source, &dest) {
            Ok(MoveOutcome::Moved(dest)) => {
                info!(
                    source = %path.display(),
                    destination = %dest.display(),
                    category = %record.category,
                    modified = %record.modified,
                    "Moved file"
                );
                Ok(FileResult::new(path, Some(dest), ProcessingStatus::Moved))
            }
            Ok(MoveOutcome::Planned(dest)) => {
                info!(
                    source = %path.display(),
                    destination = %dest.display(),
                    category = %record.category,
                    "Would move file"
                );
                Ok(FileResult::new(path, Some(dest), ProcessingStatus::Planned))
            }
            Ok(MoveOutcome::ConflictSkipped(dest)) => {
                warn!(
                    source = %path.display(),
                    destination = %dest.display(),
                    "Destination exists, skipping"
                );
                Ok(FileResult::new(
                    path,
                    Some(dest),
                    ProcessingStatus::ConflictSkipped,
                ))
            }
            Ok(MoveOutcome::AlreadyInPlace(dest)) => {
                debug!(destination = %dest.display(), "Already in place");
                Ok(FileResult::new(
                    path,
                    Some(dest),
                    ProcessingStatus::AlreadyInPlace,
                ))
            }
            Err(e) => Err(fail(Some(dest), e)),
        }
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Canonical source root in use
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Absolute destination root in use
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Canonical form of an existing directory, or an absolute path for one
/// that does not exist yet (dry run).
fn resolve_dir(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(p) => Ok(p),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(std::path::absolute(path)?),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use filetime::FileTime;
    use tempfile::tempdir;

    #[test]
    fn test_processing_stats() {
        let mut stats = ProcessingStats::new();
        stats.discovered = 9;
        for _ in 0..5 {
            stats.record(ProcessingStatus::Moved);
        }
        stats.record(ProcessingStatus::Unclassified);
        stats.record(ProcessingStatus::Unclassified);
        stats.record(ProcessingStatus::ConflictSkipped);
        stats.record(ProcessingStatus::AlreadyInPlace);
        stats.record(ProcessingStatus::Failed);

        let summary = stats.summary();
        assert!(summary.contains("Discovered: 9"));
        assert!(summary.contains("Moved: 5"));
        assert!(summary.contains("Unclassified: 2"));
        assert!(summary.contains("Conflicts: 1"));
        assert!(summary.contains("In place: 1"));
        assert!(summary.contains("Failed: 1"));
    }

    #[test]
    fn test_file_record_inspect() {
        let dir = tempdir().unwrap();
        let classifier = Classifier::default();

        let text = dir.path().join("notes.txt");
        fs::write(&text, b"x").unwrap();
        assert!(FileRecord::inspect(&text, &classifier).unwrap().is_none());

        let picture = dir.path().join("picture.png");
        fs::write(&picture, b"x").unwrap();
        let modified = Local.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        filetime::set_file_mtime(&picture, FileTime::from_unix_time(modified.timestamp(), 0))
            .unwrap();

        let record = FileRecord::inspect(&picture, &classifier).unwrap().unwrap();
        assert_eq!(record.category, MediaCategory::Picture);
        assert_eq!(record.modified, modified);
        assert_eq!(
            record.destination(Path::new("/media"), "me").unwrap(),
            PathBuf::from("/media/pictures/me/2000/january/picture.png")
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            source: PathBuf::from("in"),
            destination: PathBuf::from("out"),
            person: "a/b".into(),
            ..Config::default()
        };
        assert!(matches!(Processor::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempdir().unwrap();
        let config = Config {
            source: dir.path().join("missing"),
            destination: dir.path().join("out"),
            person: "me".into(),
            ..Config::default()
        };
        assert!(matches!(
            Processor::new(config),
            Err(Error::SourceNotFound { .. })
        ));
        assert!(!dir.path().join("out").exists());
    }
}
