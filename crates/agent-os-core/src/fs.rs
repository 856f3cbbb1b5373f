//! Filesystem capability used by every reconciliation step.
//!
//! Steps never touch `std::fs` directly; they receive a `&dyn FileSystem`
//! so the whole pipeline can run against an in-memory fake in tests.

use crate::error::{InstallerError, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the whole file. Parent directories are created as needed.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Append text, creating the file if it does not exist.
    fn append(&self, path: &Path, text: &str) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Recursively copy the directory `from` to `to`.
    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Move `from` to `to` in one step. Both live on the same filesystem.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a fresh, empty scratch directory whose name starts with `prefix`.
    fn temp_dir(&self, prefix: &str) -> io::Result<PathBuf>;
}

/// The real disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Atomically write via a tempfile in the same directory, so a crash
    /// mid-write never leaves a truncated manifest behind.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn append(&self, path: &Path, text: &str) -> io::Result<()> {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        f.write_all(text.as_bytes())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::create_dir_all(to)?;
        for entry in std::fs::read_dir(from)? {
            let entry = entry?;
            let target = to.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                self.copy_dir(&entry.path(), &target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    /// A private (0700 on unix) directory under the system temp dir, never
    /// one that already existed. The caller owns its removal.
    fn temp_dir(&self, prefix: &str) -> io::Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o700));
        }
        Ok(builder.tempdir()?.keep())
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by the steps
// ---------------------------------------------------------------------------

/// Write a file through `fs`, mapping failures to `ConfigWrite`.
pub fn write_file(fs: &dyn FileSystem, path: &Path, data: &[u8]) -> Result<()> {
    fs.write(path, data).map_err(|source| InstallerError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(fs: &dyn FileSystem, path: &Path, data: &[u8]) -> Result<bool> {
    if fs.exists(path) {
        return Ok(false);
    }
    write_file(fs, path, data)?;
    Ok(true)
}

/// Outcome of [`ensure_ignore_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreEntry {
    Added,
    AlreadyPresent,
    /// There is no ignore file to extend; nothing was created.
    NoIgnoreFile,
}

/// Add `entry` to an existing ignore file if no line already matches it.
///
/// Exactly one line is appended; a newline separator is only inserted when
/// the file does not already end with one.
pub fn ensure_ignore_entry(fs: &dyn FileSystem, path: &Path, entry: &str) -> Result<IgnoreEntry> {
    if !fs.exists(path) {
        return Ok(IgnoreEntry::NoIgnoreFile);
    }
    let existing = fs.read_to_string(path)?;
    if existing.lines().any(|l| l.trim() == entry) {
        return Ok(IgnoreEntry::AlreadyPresent);
    }
    let sep = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    fs.append(path, &format!("{sep}{entry}\n"))
        .map_err(|source| InstallerError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(IgnoreEntry::Added)
}
