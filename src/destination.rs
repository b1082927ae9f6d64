//! Destination path construction
//!
//! Every media file lands at
//! `<root>/<category>/<person>/<YYYY>/<month name>/<file name>`.
//! The path depends only on these inputs, never on where the file sat
//! inside the source tree.

use crate::category::MediaCategory;
use crate::time::MONTH_NAMES;
use chrono::{DateTime, Datelike, TimeZone};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Directory a file of `category`, owned by `person` and last modified at
/// `modified`, belongs in.
pub fn destination_dir<Tz: TimeZone>(
    root: &Path,
    category: MediaCategory,
    person: &str,
    modified: &DateTime<Tz>,
) -> PathBuf {
    let mut dest = root.to_path_buf();
    dest.push(category.folder_name());
    dest.push(person);
    dest.push(format!("{:04}", modified.year()));
    // month0() is always 0..=11
    dest.push(MONTH_NAMES[modified.month0() as usize]);
    dest
}

/// Full destination path, keeping the original file name verbatim
pub fn build_destination<Tz: TimeZone>(
    root: &Path,
    category: MediaCategory,
    person: &str,
    modified: &DateTime<Tz>,
    file_name: &OsStr,
) -> PathBuf {
    destination_dir(root, category, person, modified).join(file_name)
}
