//! Modification time handling
//!
//! Destination folders are derived from the file system modification
//! time, read in the local timezone:
//! - year: the 4-digit calendar year
//! - month: the lowercase English month name (see [`month`])

pub mod month;

pub use month::MONTH_NAMES;

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Local};
use filetime::FileTime;
use std::fs::Metadata;
use std::path::Path;

/// Years representable as a 4-digit folder name
const VALID_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Read the modification time of a file in the local timezone.
///
/// Timestamps chrono cannot represent, or whose year falls outside
/// 1..=9999, are reported as [`Error::InvalidModificationTime`].
pub fn modification_time(path: &Path, metadata: &Metadata) -> Result<DateTime<Local>> {
    let filetime = FileTime::from_last_modification_time(metadata);
    from_file_time(path, filetime)
}

fn from_file_time(path: &Path, filetime: FileTime) -> Result<DateTime<Local>> {
    let utc = DateTime::from_timestamp(filetime.unix_seconds(), filetime.nanoseconds())
        .ok_or_else(|| Error::InvalidModificationTime {
            path: path.to_path_buf(),
            message: format!("timestamp {} out of range", filetime.unix_seconds()),
        })?;

    let local = utc.with_timezone(&Local);
    if !VALID_YEARS.contains(&local.year()) {
        return Err(Error::InvalidModificationTime {
            path: path.to_path_buf(),
            message: format!("year {} cannot be used as a folder name", local.year()),
        });
    }

    Ok(local)
}
