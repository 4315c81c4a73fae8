//! File system access used by the vault.
//!
//! Everything the rename flow needs from the host goes through
//! [`VaultFs`], so tests and other hosts can swap in their own storage.

use std::io;
use std::path::Path;

/// Abstract interface for the file operations the vault performs.
pub trait VaultFs: Send + Sync {
    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the contents of a file.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Names of the regular files directly inside `dir` (no directories,
    /// no recursion). The result is a snapshot taken at call time.
    fn list_file_names(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Rename `from` to `to` within the same directory tree.
    ///
    /// Must fail with [`io::ErrorKind::AlreadyExists`] instead of replacing
    /// an existing `to`, and must leave `from` in place on failure.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn is_file(&self, path: &Path) -> bool;
}

/// Standard implementation of [`VaultFs`] using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalFs;

impl VaultFs for PhysicalFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn list_file_names(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if to.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        std::fs::rename(from, to)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
