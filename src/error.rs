//! Error types for featdb operations.
//!
//! Every failure surfaced by the store, the persistence layer and the
//! recognizer is a [`FeatDbError`]. [`FeatDbError::kind`] folds the detailed
//! variants down to the five coarse [`ErrorKind`]s callers usually branch on.

use std::io;
use thiserror::Error;

/// Result type alias using [`FeatDbError`].
pub type Result<T> = std::result::Result<T, FeatDbError>;

/// Coarse classification of a [`FeatDbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Open, seek, read or write did not complete as requested.
    IoFailure,
    /// Stored feature length disagrees with the requested one.
    FormatMismatch,
    /// File contents contradict the header.
    Corruption,
    /// The identity is not currently live.
    InvalidIdentity,
    /// A caller-supplied argument was rejected.
    InvalidArgument,
}

/// Errors that can occur during featdb operations.
#[derive(Error, Debug)]
pub enum FeatDbError {
    /// I/O error during file operations, including short reads.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The database file was created for a different feature length.
    #[error("feature length mismatch: database stores {stored}, requested {requested}")]
    FormatMismatch {
        /// Feature length recorded in the file header.
        stored: u16,
        /// Feature length the caller opened the database with.
        requested: u16,
    },

    /// The file contents disagree with its header.
    #[error("database corrupted: {0}")]
    Corruption(String),

    /// The identity does not name a live record.
    #[error("invalid identity: {0} is not a live record")]
    InvalidIdentity(u16),

    /// Invalid argument value provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Feature vector length does not match the database.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Feature length of the database.
        expected: usize,
        /// Length of the vector provided.
        actual: usize,
    },

    /// Operation requires at least one live record.
    #[error("empty database: no live records")]
    EmptyDatabase,

    /// Every 16-bit identity has already been assigned.
    #[error("identity space exhausted: {0} identities already assigned")]
    IdentitySpaceExhausted(u16),

    /// A previous write failed; memory and file may disagree until reload.
    #[error("database poisoned by an earlier failed write, reload required")]
    Poisoned,

    /// Enrollment was requested but no detection was supplied.
    #[error("no detection to enroll")]
    NoDetection,

    /// Enrollment was requested with more than one detection.
    #[error("only one detection can be enrolled at a time, got {0}")]
    MultipleDetections(usize),

    /// Validated enrollment found a sufficiently similar live record.
    #[error("already enrolled as {id} (similarity {similarity:.3})")]
    AlreadyEnrolled {
        /// Identity of the matching record.
        id: u16,
        /// Similarity between the probe and that record.
        similarity: f32,
    },
}

impl FeatDbError {
    /// Creates a new `DimensionMismatch` error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates a new `FormatMismatch` error.
    pub fn format_mismatch(stored: u16, requested: u16) -> Self {
        Self::FormatMismatch { stored, requested }
    }

    /// Creates a new `InvalidArgument` error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a new `Corruption` error.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Poisoned => ErrorKind::IoFailure,
            Self::FormatMismatch { .. } => ErrorKind::FormatMismatch,
            Self::Corruption(_) => ErrorKind::Corruption,
            Self::InvalidIdentity(_) | Self::EmptyDatabase => ErrorKind::InvalidIdentity,
            Self::InvalidArgument(_)
            | Self::DimensionMismatch { .. }
            | Self::IdentitySpaceExhausted(_)
            | Self::NoDetection
            | Self::MultipleDetections(_)
            | Self::AlreadyEnrolled { .. } => ErrorKind::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FeatDbError::dimension_mismatch(512, 128);
        assert_eq!(err.to_string(), "dimension mismatch: expected 512, got 128");

        let err = FeatDbError::format_mismatch(512, 4);
        assert_eq!(
            err.to_string(),
            "feature length mismatch: database stores 512, requested 4"
        );

        let err = FeatDbError::InvalidIdentity(7);
        assert_eq!(err.to_string(), "invalid identity: 7 is not a live record");

        let err = FeatDbError::EmptyDatabase;
        assert_eq!(err.to_string(), "empty database: no live records");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: FeatDbError = io_err.into();
        assert!(matches!(err, FeatDbError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            FeatDbError::format_mismatch(4, 8).kind(),
            ErrorKind::FormatMismatch
        );
        assert_eq!(FeatDbError::corruption("x").kind(), ErrorKind::Corruption);
        assert_eq!(
            FeatDbError::InvalidIdentity(3).kind(),
            ErrorKind::InvalidIdentity
        );
        assert_eq!(
            FeatDbError::dimension_mismatch(4, 3).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            FeatDbError::invalid_argument("top_k").kind(),
            ErrorKind::InvalidArgument
        );
    }
}
