//! File access used by the include stage.

use std::io;
use std::path::Path;

/// Read-only view of the files a document can include.
pub trait FileSource: Send + Sync {
    /// Read the whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;
}

/// [`FileSource`] backed by the local file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "hello\n").unwrap();

        let source = FsSource;
        assert!(source.exists(&file));
        assert!(!source.is_dir(&file));
        assert!(source.is_dir(dir.path()));
        assert!(!source.exists(&dir.path().join("missing.txt")));
        assert_eq!(source.read_to_string(&file).unwrap(), "hello\n");
    }
}
