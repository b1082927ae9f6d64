//! Extension-based media classification

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Default picture extensions (lowercase, without the dot)
pub const PICTURE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "avif", "tiff", "tif", "svg",
    "ico", "raw", "arw", "cr2", "cr3", "nef", "orf", "rw2", "dng", "raf", "srw", "pef",
];

/// Default video extensions (lowercase, without the dot)
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "avi", "mkv", "wmv", "flv", "webm", "3gp", "3g2", "mpg", "mpeg", "mts",
    "m2ts", "ts", "vob", "ogv",
];

/// Media category of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Picture,
    Video,
}

impl MediaCategory {
    /// Folder name used for this category in the destination tree
    pub fn folder_name(&self) -> &'static str {
        match self {
            MediaCategory::Picture => "pictures",
            MediaCategory::Video => "videos",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Maps file extensions to media categories.
///
/// The table is built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct Classifier {
    table: HashMap<String, MediaCategory>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_extensions(PICTURE_EXTENSIONS, VIDEO_EXTENSIONS)
    }
}

impl Classifier {
    /// Build a classifier from picture and video extension lists.
    /// Extensions are matched case-insensitively and may carry a leading dot.
    pub fn from_extensions<P, V>(pictures: &[P], videos: &[V]) -> Self
    where
        P: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = HashMap::new();
        for ext in pictures {
            table.insert(normalize(ext.as_ref()), MediaCategory::Picture);
        }
        for ext in videos {
            table.insert(normalize(ext.as_ref()), MediaCategory::Video);
        }
        Self { table }
    }

    /// Category for a bare extension, `None` if unknown
    pub fn category_for_extension(&self, ext: &str) -> Option<MediaCategory> {
        self.table.get(&normalize(ext)).copied()
    }

    /// Classify a file by its extension. Files without an extension, or
    /// with a non-UTF-8 one, are unknown.
    pub fn classify(&self, path: &Path) -> Option<MediaCategory> {
        let ext = path.extension()?.to_str()?;
        self.category_for_extension(ext)
    }

    /// Number of known extensions
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_extension() {
        let classifier = Classifier::default();
        for ext in PICTURE_EXTENSIONS {
            assert_eq!(
                classifier.category_for_extension(ext),
                Some(MediaCategory::Picture),
                "{ext}"
            );
        }
        for ext in VIDEO_EXTENSIONS {
            assert_eq!(
                classifier.category_for_extension(ext),
                Some(MediaCategory::Video),
                "{ext}"
            );
        }
        assert_eq!(
            classifier.len(),
            PICTURE_EXTENSIONS.len() + VIDEO_EXTENSIONS.len()
        );
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(Path::new("IMG_0001.JPG")),
            Some(MediaCategory::Picture)
        );
        assert_eq!(
            classifier.classify(Path::new("clip.Mp4")),
            Some(MediaCategory::Video)
        );
    }

    #[test]
    fn test_unknown_files() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(Path::new("notes.txt")), None);
        assert_eq!(classifier.classify(Path::new("Makefile")), None);
        assert_eq!(classifier.classify(Path::new(".png")), None);
        assert_eq!(classifier.classify(Path::new("archive.png.zip")), None);
    }

    #[test]
    fn test_custom_table() {
        let classifier = Classifier::from_extensions(&[".PNG"], &["mkv"]);
        assert_eq!(
            classifier.classify(Path::new("a.png")),
            Some(MediaCategory::Picture)
        );
        assert_eq!(classifier.classify(Path::new("a.jpg")), None);
        assert_eq!(
            classifier.classify(Path::new("a.MKV")),
            Some(MediaCategory::Video)
        );
    }

    #[test]
    fn test_folder_names() {
        assert_eq!(MediaCategory::Picture.to_string(), "pictures");
        assert_eq!(MediaCategory::Video.to_string(), "videos");
    }
}
