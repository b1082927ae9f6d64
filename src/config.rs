//! Configuration types for media-shelf

use crate::category::{Classifier, PICTURE_EXTENSIONS, VIDEO_EXTENSIONS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What to do when a file's destination is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Report a conflict error and leave the source in place (default)
    #[default]
    Fail,
    /// Leave the source in place without reporting an error
    Skip,
    /// Append `_1`, `_2`, ... to the file stem until the name is free
    Rename,
}

/// What to do when a single file cannot be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the error and move on to the next file (default)
    #[default]
    Continue,
    /// Stop the run at the first failing file
    Abort,
}

/// Configuration for media-shelf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned recursively for media files
    pub source: PathBuf,

    /// Root of the organized tree
    pub destination: PathBuf,

    /// Owner label, used as a single path segment
    pub person: String,

    /// Destination collision handling
    pub on_conflict: ConflictPolicy,

    /// Per-file error handling
    pub on_error: ErrorPolicy,

    /// Dry run mode - report moves without touching the file system
    pub dry_run: bool,

    /// Verbose output
    pub verbose: bool,

    /// Extensions classified as pictures
    pub picture_extensions: Vec<String>,

    /// Extensions classified as videos
    pub video_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            person: String::new(),
            on_conflict: ConflictPolicy::default(),
            on_error: ErrorPolicy::default(),
            dry_run: false,
            verbose: false,
            picture_extensions: PICTURE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            video_extensions: VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl Config {
    /// Build the extension classifier for this configuration
    pub fn classifier(&self) -> Classifier {
        Classifier::from_extensions(&self.picture_extensions, &self.video_extensions)
    }

    /// Check that the configuration describes a runnable job
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.as_os_str().is_empty() {
            return Err(ConfigError::Missing("source"));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(ConfigError::Missing("destination"));
        }
        validate_person(&self.person)?;

        if self.source == self.destination {
            return Err(ConfigError::SameDirectory(self.source.clone()));
        }

        let pictures: HashSet<String> = self
            .picture_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        if let Some(ext) = self
            .video_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .find(|e| pictures.contains(e))
        {
            return Err(ConfigError::AmbiguousExtension(ext));
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# media-shelf configuration file
# This file uses TOML format (https://toml.io)
# Command line arguments override values set here.

# Directory scanned recursively for pictures and videos
source = "/home/me/Camera"

# Root of the organized tree:
#   <destination>/<pictures|videos>/<person>/<year>/<month>/<file>
destination = "/srv/media"

# Owner label, used as one folder name
person = "me"

# When the destination file already exists: "fail", "skip" or "rename"
# - fail: report an error and leave the source in place (default)
# - skip: leave the source in place silently
# - rename: add _1, _2, ... to the file name
on_conflict = "fail"

# When a single file cannot be moved: "continue" or "abort"
on_error = "continue"

# Dry run mode - show what would be done without actually doing it
dry_run = false

# Verbose output - show detailed processing information
verbose = false

# Extension tables (case-insensitive, no leading dot needed)
picture_extensions = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "avif", "tiff", "tif", "svg", "ico", "raw", "arw", "cr2", "cr3", "nef", "orf", "rw2", "dng", "raf", "srw", "pef"]
video_extensions = ["mp4", "m4v", "mov", "avi", "mkv", "wmv", "flv", "webm", "3gp", "3g2", "mpg", "mpeg", "mts", "m2ts", "ts", "vob", "ogv"]
"#
        .to_string()
    }
}

fn validate_person(person: &str) -> Result<(), ConfigError> {
    let invalid = person.is_empty()
        || person == "."
        || person == ".."
        || person.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ConfigError::InvalidPerson(person.to_string()));
    }
    Ok(())
}

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Person label '{0}' must be a single, non-empty folder name")]
    InvalidPerson(String),

    #[error("Source and destination are the same directory: {}", .0.display())]
    SameDirectory(PathBuf),

    #[error("Extension '{0}' is listed as both picture and video")]
    AmbiguousExtension(String),
}
