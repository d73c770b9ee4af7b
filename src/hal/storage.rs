// Persistent-storage contract plus the std::fs implementation.
//
// "File not found" is a distinguished, non-fatal result: the optional
// artifacts (coefficient override, border image) simply do not have to
// exist.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The file is not there. Callers of optional artifacts treat this as
    /// a normal outcome.
    #[error("file not found")]
    NotFound,
    /// The file exists but is shorter than the caller's buffer. Reads are
    /// all-or-nothing, so nothing was delivered.
    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub trait Storage: Send + Sync {
    /// Fill `buf` from the start of `path`. All-or-nothing: on any error
    /// the buffer's prior contents are not meaningful and the caller's
    /// fallback data stays in effect.
    fn read(&self, path: &str, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` to `path`, replacing any existing file.
    fn write(&self, path: &str, data: &[u8]) -> Result<(), StorageError>;
}

/// Storage rooted at a host directory.
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(Path::new(path))
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &str, buf: &mut [u8]) -> Result<(), StorageError> {
        let full = self.resolve(path);
        let mut file = match fs::File::open(&full) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound)
            }
            Err(err) => return Err(err.into()),
        };
        match file.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                let actual = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
                Err(StorageError::Truncated {
                    expected: buf.len(),
                    actual,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, data)?;
        Ok(())
    }
}
