//! Query surface for external log viewers
//!
//! The interactive viewing layer lives outside this crate; everything it
//! needs is a flat file listing plus read, delete, and truncate.

use crate::archive::collect::base_log_name;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Reference to one on-disk log file (active or backup)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Read-mostly view over a logs directory
#[derive(Debug, Clone)]
pub struct LogDirectory {
    dir: PathBuf,
}

impl LogDirectory {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// List log files (active and backups), sorted by name
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read. A directory that
    /// does not exist yet lists as empty.
    pub fn list_log_files(&self) -> io::Result<Vec<FileRef>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            if base_log_name(&name).is_none() {
                continue;
            }

            let size = entry.metadata()?.len();
            files.push(FileRef { name, path, size });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Read a file's full contents
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, file: &FileRef) -> io::Result<String> {
        fs::read_to_string(&file.path)
    }

    /// Delete a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    pub fn delete_file(&self, file: &FileRef) -> io::Result<()> {
        fs::remove_file(&file.path)
    }

    /// Truncate a file to empty without deleting it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be truncated.
    pub fn clear_file(&self, file: &FileRef) -> io::Result<()> {
        OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&file.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_list_is_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "net.log", "n");
        touch(dir.path(), "app.log", "a");
        touch(dir.path(), "app.log.1", "old");
        touch(dir.path(), "readme.md", "not a log");

        let store = LogDirectory::new(dir.path());
        let files = store.list_log_files().unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["app.log", "app.log.1", "net.log"]);
        assert_eq!(files[1].size, 3);
    }

    #[test]
    fn test_missing_directory_lists_empty() {
        let dir = tempdir().unwrap();
        let store = LogDirectory::new(dir.path().join("nope"));
        assert!(store.list_log_files().unwrap().is_empty());
    }

    #[test]
    fn test_read_delete_clear() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "app.log", "hello\n");
        touch(dir.path(), "net.log", "bye\n");

        let store = LogDirectory::new(dir.path());
        let files = store.list_log_files().unwrap();

        assert_eq!(store.read_file(&files[0]).unwrap(), "hello\n");

        store.clear_file(&files[0]).unwrap();
        assert_eq!(store.read_file(&files[0]).unwrap(), "");
        assert!(files[0].path.exists());

        store.delete_file(&files[1]).unwrap();
        assert!(!files[1].path.exists());
        assert_eq!(store.list_log_files().unwrap().len(), 1);
    }
}
