//! Error types for index operations.
//!
//! Every fallible operation in the crate returns [`Error`], which wraps a
//! public [`ErrorKind`] naming the failure category. The binaries treat
//! any error as fatal: one line on stderr and a non-zero exit.

use std::io;

use thiserror::Error;

/// The error type for index file and tree operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Returns the corresponding [`ErrorKind`] for this error.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    pub(crate) fn invalid_argument(what: &'static str) -> Self {
        Self::new(ErrorKind::InvalidArgument(what))
    }

    pub(crate) fn incompatible(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::IncompatibleVersion(detail.into()))
    }

    pub(crate) fn io(op: IoOp, source: io::Error) -> Self {
        Self::new(ErrorKind::Io { op, source })
    }

    pub(crate) fn tree_empty() -> Self {
        Self::new(ErrorKind::TreeEmpty)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

/// A list specifying categories of index errors.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A required input was absent or blank.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The on-disk tree order or block layout does not match this build.
    #[error("index file is incompatible with this program: {0}")]
    IncompatibleVersion(String),

    /// The node buffer could not be allocated. Reserved: allocation is
    /// infallible in this implementation.
    #[error("insufficient memory for node buffer")]
    NoMemory,

    /// A file-system operation on the index file failed.
    #[error("cannot {op} index file: {source}")]
    Io {
        /// The operation that failed.
        op: IoOp,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A lookup was attempted on an empty tree.
    #[error("the tree is empty")]
    TreeEmpty,
}

/// The file operation that produced an [`ErrorKind::Io`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Create,
    Open,
    Close,
    Read,
    Write,
    Seek,
}

impl std::fmt::Display for IoOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            IoOp::Create => "create",
            IoOp::Open => "open",
            IoOp::Close => "close",
            IoOp::Read => "read from",
            IoOp::Write => "write to",
            IoOp::Seek => "move within",
        })
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
