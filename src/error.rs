//! Crate error type and the stable codes reported across the C boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Stable machine-readable codes written into `yahtzeevalue_error.code`.
///
/// Values never change meaning; new kinds get new numbers.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound = 1,
    CorruptTable = 2,
    Io = 3,
    InvalidKey = 4,
    IncompatibleState = 5,
    UseAfterUnload = 6,
    /// Reserved. Every entry point initializes on demand, so this is never reported.
    NotInitialized = 7,
    InvalidArgument = 8,
    InvalidHandle = 9,
    Internal = 10,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no value table found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("corrupt value table {}: {reason}", path.display())]
    CorruptTable { path: PathBuf, reason: String },

    #[error("failed to read value table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state key {0} is outside the encoded domain")]
    InvalidStateKey(i64),

    #[error("histogram key {0} does not encode a five-dice histogram")]
    InvalidHistogramKey(i64),

    #[error("state key {0} has no open category, so no roll can be decided there")]
    IncompatibleState(u32),

    #[error("handle {0:#x} was already unloaded")]
    UseAfterUnload(usize),

    #[error("handle {0:#x} was not issued by this library")]
    InvalidHandle(usize),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::CorruptTable { .. } => ErrorCode::CorruptTable,
            Error::Io { .. } => ErrorCode::Io,
            Error::InvalidStateKey(_) | Error::InvalidHistogramKey(_) => ErrorCode::InvalidKey,
            Error::IncompatibleState(_) => ErrorCode::IncompatibleState,
            Error::UseAfterUnload(_) => ErrorCode::UseAfterUnload,
            Error::InvalidHandle(_) => ErrorCode::InvalidHandle,
            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::Internal(_) => ErrorCode::Internal,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptTable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify an I/O failure on `path`: a missing file is `NotFound`,
    /// everything else stays an I/O error.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound(path)
        } else {
            Error::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::NotFound as i32, 1);
        assert_eq!(ErrorCode::CorruptTable as i32, 2);
        assert_eq!(ErrorCode::Io as i32, 3);
        assert_eq!(ErrorCode::InvalidKey as i32, 4);
        assert_eq!(ErrorCode::IncompatibleState as i32, 5);
        assert_eq!(ErrorCode::UseAfterUnload as i32, 6);
        assert_eq!(ErrorCode::NotInitialized as i32, 7);
        assert_eq!(ErrorCode::InvalidArgument as i32, 8);
        assert_eq!(ErrorCode::InvalidHandle as i32, 9);
        assert_eq!(ErrorCode::Internal as i32, 10);
    }

    #[test]
    fn test_io_classification() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(
            Error::from_io("/x", missing).code(),
            ErrorCode::NotFound
        );
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(Error::from_io("/x", denied).code(), ErrorCode::Io);
    }

    #[test]
    fn test_messages_name_the_key() {
        assert!(Error::InvalidStateKey(-3).to_string().contains("-3"));
        assert!(Error::InvalidHistogramKey(252).to_string().contains("252"));
    }
}
