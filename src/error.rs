//! Error types for media-shelf

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media-shelf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-shelf
#[derive(Error, Debug)]
pub enum Error {
    #[error("Source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Source directory {path} is not readable: {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create destination directory {path}: {source}")]
    DestinationCreateFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Destination already exists: {path}")]
    DestinationConflict { path: PathBuf },

    #[error("Failed to move {from} to {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid modification time for {path}: {message}")]
    InvalidModificationTime { path: PathBuf, message: String },

    #[error("File has no usable name: {path}")]
    MissingFileName { path: PathBuf },

    #[error("Failed to read metadata of {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Directory traversal error: {0}")]
    Traversal(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
