//! Error taxonomy for sweeping.
//!
//! Only [`SweepError`] ever escapes [`crate::sweep`]; everything that goes wrong
//! while deleting a matched entry becomes a [`RemovalError`] recorded against the
//! category that matched it.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors, raised before anything is deleted
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("sweep root {} does not exist", .0.display())]
    InvalidRoot(PathBuf),

    #[error("sweep root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("could not inspect sweep root {}: {source}", .path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Categories(#[from] CategoryError),
}

/// A matched entry that could not be removed
#[derive(Debug, Error)]
pub enum RemovalError {
    #[error("permission denied removing {}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is in use by another process", .path.display())]
    InUse {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "refusing to remove {}: parent {} is a symlink",
        .path.display(),
        .link.display()
    )]
    SymlinkedParent { path: PathBuf, link: PathBuf },

    #[error("failed to remove {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION
const WINDOWS_LOCK_CODES: [i32; 2] = [32, 33];

impl RemovalError {
    /// Classify an I/O error raised while removing `path`
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied => RemovalError::PermissionDenied { path, source },
            io::ErrorKind::ResourceBusy | io::ErrorKind::ExecutableFileBusy => {
                RemovalError::InUse { path, source }
            }
            _ if cfg!(windows)
                && source
                    .raw_os_error()
                    .is_some_and(|code| WINDOWS_LOCK_CODES.contains(&code)) =>
            {
                RemovalError::InUse { path, source }
            }
            _ => RemovalError::Io { path, source },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            RemovalError::PermissionDenied { path, .. }
            | RemovalError::InUse { path, .. }
            | RemovalError::SymlinkedParent { path, .. }
            | RemovalError::Io { path, .. } => path,
        }
    }
}

/// Problems with a category table
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("failed to parse category table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("category table is empty")]
    Empty,

    #[error("category '{label}': {reason}")]
    Invalid { label: String, reason: String },

    #[error("category '{label}': invalid glob '{pattern}': {source}")]
    Glob {
        label: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_classified() {
        let err = RemovalError::from_io(
            Path::new("a/__pycache__"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, RemovalError::PermissionDenied { .. }));
        assert_eq!(err.path(), Path::new("a/__pycache__"));
    }

    #[test]
    fn test_busy_is_in_use() {
        let err = RemovalError::from_io(
            Path::new(".coverage"),
            io::Error::from(io::ErrorKind::ResourceBusy),
        );
        assert!(matches!(err, RemovalError::InUse { .. }));
        assert!(err.to_string().contains("in use"));
    }

    #[test]
    fn test_other_errors_fall_through_to_io() {
        let err = RemovalError::from_io(
            Path::new("mod.pyc"),
            io::Error::new(io::ErrorKind::Other, "disk on fire"),
        );
        assert!(matches!(err, RemovalError::Io { .. }));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_sweep_error_messages_name_the_root() {
        let err = SweepError::NotADirectory(PathBuf::from("/tmp/notes.txt"));
        assert_eq!(err.to_string(), "sweep root /tmp/notes.txt is not a directory");
    }
}
