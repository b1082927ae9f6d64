//! Relocating files into the destination tree

use crate::config::ConflictPolicy;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Upper bound for `_N` suffixes tried by [`ConflictPolicy::Rename`]
const MAX_RENAME_SUFFIX: u32 = 10_000;

const COPY_BUFFER_SIZE: usize = 256 * 1024;

/// What happened to a file handed to [`Mover::relocate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// File now lives at the contained path
    Moved(PathBuf),
    /// Dry run: file would have been moved to the contained path
    Planned(PathBuf),
    /// Destination was taken and the policy said to leave the file alone
    ConflictSkipped(PathBuf),
    /// Source already is the file at its destination
    AlreadyInPlace(PathBuf),
}

/// Moves files into place, creating directories on demand and applying
/// the configured conflict policy.
#[derive(Debug)]
pub struct Mover {
    conflict: ConflictPolicy,
    dry_run: bool,
    /// Destinations claimed during a dry run
    planned: HashSet<PathBuf>,
}

impl Mover {
    pub fn new(conflict: ConflictPolicy, dry_run: bool) -> Self {
        Self {
            conflict,
            dry_run,
            planned: HashSet::new(),
        }
    }

    /// Move `source` to `dest`, or plan to in dry-run mode.
    pub fn relocate(&mut self, source: &Path, dest: &Path) -> Result<MoveOutcome> {
        if is_same_file(source, dest) {
            return Ok(MoveOutcome::AlreadyInPlace(dest.to_path_buf()));
        }

        let dest = match self.resolve_conflict(dest)? {
            Some(dest) => dest,
            None => return Ok(MoveOutcome::ConflictSkipped(dest.to_path_buf())),
        };

        if self.dry_run {
            self.planned.insert(dest.clone());
            return Ok(MoveOutcome::Planned(dest));
        }

        ensure_parent_dirs(&dest)?;
        move_file(source, &dest)?;
        Ok(MoveOutcome::Moved(dest))
    }

    fn is_occupied(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok() || self.planned.contains(path)
    }

    /// Apply the conflict policy. `Ok(None)` means skip this file.
    fn resolve_conflict(&self, dest: &Path) -> Result<Option<PathBuf>> {
        if !self.is_occupied(dest) {
            return Ok(Some(dest.to_path_buf()));
        }

        match self.conflict {
            ConflictPolicy::Fail => Err(Error::DestinationConflict {
                path: dest.to_path_buf(),
            }),
            ConflictPolicy::Skip => {
                debug!(destination = %dest.display(), "Destination taken, leaving source in place");
                Ok(None)
            }
            ConflictPolicy::Rename => self.next_free_name(dest).map(Some),
        }
    }

    /// `name.ext` -> `name_1.ext`, `name_2.ext`, ... until one is free
    fn next_free_name(&self, dest: &Path) -> Result<PathBuf> {
        let stem = dest
            .file_stem()
            .ok_or_else(|| Error::MissingFileName {
                path: dest.to_path_buf(),
            })?
            .to_os_string();
        let extension = dest.extension().map(|e| e.to_os_string());
        let parent = dest.parent().map(Path::to_path_buf).unwrap_or_default();

        for i in 1..MAX_RENAME_SUFFIX {
            let mut name = stem.clone();
            name.push(format!("_{i}"));
            if let Some(ref ext) = extension {
                name.push(".");
                name.push(ext);
            }
            let candidate = parent.join(name);
            if !self.is_occupied(&candidate) {
                return Ok(candidate);
            }
        }

        Err(Error::DestinationConflict {
            path: dest.to_path_buf(),
        })
    }
}

/// Both paths exist and resolve to the same file
fn is_same_file(source: &Path, dest: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(dest)) {
        (Ok(source), Ok(dest)) => source == dest,
        _ => false,
    }
}

/// Create any missing directories above `dest`
pub fn ensure_parent_dirs(dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::DestinationCreateFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Rename `source` to `dest`, falling back to copy + delete when a plain
/// rename is not possible (e.g. across file systems).
pub fn move_file(source: &Path, dest: &Path) -> Result<()> {
    let rename_err = match fs::rename(source, dest) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    debug!(
        source = %source.display(),
        destination = %dest.display(),
        error = %rename_err,
        "Rename failed, falling back to copy and delete"
    );

    copy_then_remove(source, dest).map_err(|e| Error::MoveFailed {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    })
}

fn copy_then_remove(source: &Path, dest: &Path) -> io::Result<()> {
    copy_file(source, dest)?;

    // Preserve modification time
    if let Ok(metadata) = fs::metadata(source)
        && let Ok(mtime) = metadata.modified()
    {
        let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime));
    }

    if let Err(e) = fs::remove_file(source) {
        warn!(
            source = %source.display(),
            error = %e,
            "Could not remove source after copy, discarding the copy"
        );
        let _ = fs::remove_file(dest);
        return Err(e);
    }

    Ok(())
}

/// Copy file with buffered I/O, refusing to overwrite `dest`.
/// A partially written `dest` is removed on failure.
fn copy_file(source: &Path, dest: &Path) -> io::Result<()> {
    let src_file = File::open(source)?;
    let dest_file = OpenOptions::new().write(true).create_new(true).open(dest)?;

    let result = copy_contents(src_file, dest_file);
    if result.is_err() {
        let _ = fs::remove_file(dest);
    }
    result?;

    if let Ok(metadata) = fs::metadata(source) {
        let _ = fs::set_permissions(dest, metadata.permissions());
    }

    Ok(())
}

fn copy_contents(src_file: File, dest_file: File) -> io::Result<()> {
    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_missing_dirs_and_moves() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("picture.png");
        fs::write(&source, b"pixels").unwrap();
        let dest = dir.path().join("out/pictures/me/2000/january/picture.png");

        let mut mover = Mover::new(ConflictPolicy::Fail, false);
        let outcome = mover.relocate(&source, &dest).unwrap();

        assert_eq!(outcome, MoveOutcome::Moved(dest.clone()));
        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"pixels");
    }

    #[test]
    fn test_existing_dirs_are_fine() {
        let dir = tempdir().unwrap();
        let dest_dir = dir.path().join("out/videos/me/2004/october");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("other.mp4"), b"other").unwrap();

        let source = dir.path().join("video.mp4");
        fs::write(&source, b"frames").unwrap();

        let mut mover = Mover::new(ConflictPolicy::Fail, false);
        mover.relocate(&source, &dest_dir.join("video.mp4")).unwrap();

        assert_eq!(fs::read(dest_dir.join("video.mp4")).unwrap(), b"frames");
        assert_eq!(fs::read(dest_dir.join("other.mp4")).unwrap(), b"other");
    }

    #[test]
    fn test_conflict_fail_leaves_both_files() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.png");
        let dest = dir.path().join("out/a.png");
        fs::write(&source, b"new").unwrap();
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, b"old").unwrap();

        let mut mover = Mover::new(ConflictPolicy::Fail, false);
        let result = mover.relocate(&source, &dest);

        assert!(matches!(result, Err(Error::DestinationConflict { .. })));
        assert_eq!(fs::read(&source).unwrap(), b"new");
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }

    #[test]
    fn test_file_already_at_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("videos/me/2004/october/video.mp4");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, b"frames").unwrap();

        // Reached through a different spelling of the same path
        let source = dir.path().join("videos/me/2004/../2004/october/video.mp4");

        for policy in [ConflictPolicy::Fail, ConflictPolicy::Rename] {
            let mut mover = Mover::new(policy, false);
            let outcome = mover.relocate(&source, &dest).unwrap();
            assert_eq!(outcome, MoveOutcome::AlreadyInPlace(dest.clone()));
        }

        assert_eq!(fs::read(&dest).unwrap(), b"frames");
        assert!(!dest.with_file_name("video_1.mp4").exists());
    }

    #[test]
    fn test_conflict_skip() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.png");
        let dest = dir.path().join("a_dest.png");
        fs::write(&source, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        let mut mover = Mover::new(ConflictPolicy::Skip, false);
        let outcome = mover.relocate(&source, &dest).unwrap();

        assert_eq!(outcome, MoveOutcome::ConflictSkipped(dest.clone()));
        assert!(source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }

    #[test]
    fn test_conflict_rename_adds_suffix() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("clip.mp4"), b"first").unwrap();
        fs::write(out.join("clip_1.mp4"), b"second").unwrap();

        let source = dir.path().join("clip.mp4");
        fs::write(&source, b"third").unwrap();

        let mut mover = Mover::new(ConflictPolicy::Rename, false);
        let outcome = mover.relocate(&source, &out.join("clip.mp4")).unwrap();

        assert_eq!(outcome, MoveOutcome::Moved(out.join("clip_2.mp4")));
        assert_eq!(fs::read(out.join("clip_2.mp4")).unwrap(), b"third");
        assert_eq!(fs::read(out.join("clip.mp4")).unwrap(), b"first");
    }

    #[test]
    fn test_dry_run_touches_nothing_but_tracks_claims() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a/photo.jpg");
        let b = dir.path().join("b/photo.jpg");
        fs::create_dir_all(a.parent().unwrap()).unwrap();
        fs::create_dir_all(b.parent().unwrap()).unwrap();
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();
        let dest = dir.path().join("out/pictures/photo.jpg");

        let mut mover = Mover::new(ConflictPolicy::Rename, true);
        assert_eq!(
            mover.relocate(&a, &dest).unwrap(),
            MoveOutcome::Planned(dest.clone())
        );
        assert_eq!(
            mover.relocate(&b, &dest).unwrap(),
            MoveOutcome::Planned(dir.path().join("out/pictures/photo_1.jpg"))
        );

        assert!(a.exists());
        assert!(b.exists());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_copy_fallback_preserves_content_and_mtime() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.png");
        let dest = dir.path().join("b.png");
        fs::write(&source, b"data").unwrap();
        let mtime = filetime::FileTime::from_unix_time(946_728_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();

        copy_then_remove(&source, &dest).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"data");
        let meta = fs::metadata(&dest).unwrap();
        assert_eq!(filetime::FileTime::from_last_modification_time(&meta), mtime);
    }

    #[test]
    fn test_copy_fallback_never_overwrites() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.png");
        let dest = dir.path().join("b.png");
        fs::write(&source, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        let err = copy_then_remove(&source, &dest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&source).unwrap(), b"new");
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }
}
