//! Plain-text file storage used by the document session.
//!
//! The session never touches the filesystem directly; it goes through the
//! [`Storage`] trait so tests can substitute [`MemoryStorage`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// Reads and writes UTF-8 text files.
pub trait Storage {
    /// Read the whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, or `InvalidData` when the bytes are
    /// not valid UTF-8.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Replace the file contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;

    /// Resolve `path` to the absolute form used for duplicate detection.
    fn resolve(&self, path: &Path) -> PathBuf;
}

impl<S: Storage + ?Sized> Storage for Rc<S> {
    fn read(&self, path: &Path) -> io::Result<String> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        (**self).write(path, text)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        (**self).resolve(path)
    }
}

/// [`Storage`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        fs::write(path, text)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        // Canonicalize so symlinks and `..` segments collapse onto one
        // document; unsaved targets do not exist yet, so fall back.
        path.canonicalize()
            .or_else(|_| std::path::absolute(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// In-memory [`Storage`] for tests and benchmarks.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<HashMap<PathBuf, String>>,
    writes: Cell<usize>,
    reads: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        let path = self.resolve(path.as_ref());
        self.files.borrow_mut().insert(path, text.into());
        self
    }

    /// Make every subsequent write fail with `PermissionDenied`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful and failed write attempts so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Current stored text for `path`, if any.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.resolve(path.as_ref());
        self.files.borrow().get(&path).cloned()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.reads.set(self.reads.get() + 1);
        let path = self.resolve(path);
        self.files.borrow().get(&path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} (No such file or directory)", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        self.writes.set(self.writes.get() + 1);
        if self.fail_writes.get() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} (Permission denied)", path.display()),
            ));
        }
        let path = self.resolve(path);
        self.files.borrow_mut().insert(path, text.to_string());
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let base = if path.is_absolute() {
            PathBuf::new()
        } else {
            PathBuf::from("/")
        };
        // Lexical normalisation only; nothing here exists on disk.
        let mut out = base;
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    out.pop();
                }
                Component::CurDir => {}
                other => out.push(other.as_os_str()),
            }
        }
        out
    }
}
