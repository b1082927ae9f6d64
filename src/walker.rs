//! Recursive discovery of regular files under the source root

use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Lazy depth-first iterator over the regular files below a root.
///
/// Entries are visited in file-name order within each directory.
/// Symbolic links are neither followed nor yielded, and special files
/// are ignored. Errors reading nested entries are yielded as `Err` items
/// and the walk carries on.
pub struct Walker {
    root: PathBuf,
    excluded: Vec<PathBuf>,
    inner: Option<walkdir::IntoIter>,
}

impl Walker {
    /// Open a walker rooted at `root`.
    ///
    /// Fails with [`Error::SourceNotFound`] if the root does not exist and
    /// [`Error::SourceUnreadable`] if it is not a directory we can list.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();

        let metadata = fs::metadata(root).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::SourceNotFound {
                path: root.to_path_buf(),
            },
            _ => Error::SourceUnreadable {
                path: root.to_path_buf(),
                source: e,
            },
        })?;

        if !metadata.is_dir() {
            return Err(Error::SourceUnreadable {
                path: root.to_path_buf(),
                source: std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
            });
        }

        // Probe the listing up front so an unreadable root fails the run
        fs::read_dir(root).map_err(|e| Error::SourceUnreadable {
            path: root.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            excluded: Vec::new(),
            inner: None,
        })
    }

    /// Prune `path` and everything below it from the walk
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.push(path.into());
        self
    }

    /// Root directory this walker descends from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(excluded: &[PathBuf], path: &Path) -> bool {
        excluded.iter().any(|ex| path.starts_with(ex))
    }
}

impl Iterator for Walker {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.get_or_insert_with(|| {
            WalkDir::new(&self.root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
        });

        loop {
            let entry = match inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::Traversal(e))),
            };

            if entry.file_type().is_dir() {
                if entry.depth() > 0 && Self::is_excluded(&self.excluded, entry.path()) {
                    debug!(path = %entry.path().display(), "Skipping excluded directory");
                    inner.skip_current_dir();
                }
                continue;
            }

            if entry.file_type().is_file() {
                return Some(Ok(entry.into_path()));
            }

            debug!(path = %entry.path().display(), "Ignoring non-regular file");
        }
    }
}
