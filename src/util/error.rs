//! Error types for the vaspout library.

use std::path::PathBuf;
use thiserror::Error;

/// Message used for every operation on a closed store.
pub const CLOSED_MESSAGE: &str = "I/O operation on closed file.";

/// Main error type for vaspout operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Store could not be opened, or was used after it was closed
    #[error("{message}")]
    Access {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Invalid store file: expected VOUT5 magic bytes")]
    InvalidMagic,

    /// File is truncated or corrupted
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// A required leaf is missing below a namespace that exists
    #[error("Path not found in store: {0}")]
    PathNotFound(String),

    /// Type mismatch when reading data
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Child index out of bounds
    #[error("Child index {index} out of bounds (count: {count})")]
    ChildOutOfBounds { index: usize, count: usize },

    /// Write operation failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Error for any operation attempted after the store was closed.
    pub fn closed() -> Self {
        Self::Access {
            message: CLOSED_MESSAGE.to_string(),
            source: None,
        }
    }

    /// Wrap a failure to open `path` with guidance for the user.
    pub fn open_failed(path: impl Into<PathBuf>, source: Error) -> Self {
        let path = path.into();
        Self::Access {
            message: format!(
                "Error opening {} to read the data. Please check that you already \
                 completed the calculation and that the file is indeed in the \
                 directory. Please also check whether you are running the program \
                 in the same directory or pass the appropriate filename including \
                 the path.",
                path.display()
            ),
            source: Some(Box::new(source)),
        }
    }

    /// True for open failures and use-after-close.
    pub fn is_access(&self) -> bool {
        matches!(self, Self::Access { .. })
    }
}

/// Result type alias for vaspout operations.
pub type Result<T> = std::result::Result<T, Error>;
