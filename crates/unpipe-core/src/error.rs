//! Error types for streaming extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors that can occur while streaming an archive into a destination.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The source archive could not be opened for reading.
    #[error("failed to open source archive {path}: {source}")]
    SourceOpen {
        /// Path that was being opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O operation failed while reading the source or writing an entry.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink could not open its write target at the destination.
    #[error("invalid destination {path}: {reason}")]
    DestinationInvalid {
        /// Destination path as supplied by the caller.
        path: PathBuf,
        /// Why the destination was rejected.
        reason: String,
    },

    /// Archive stream is corrupted or uses an unsupported feature.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// An entry already exists and overwriting is disabled.
    #[error("refusing to overwrite existing file: {path}")]
    AlreadyExists {
        /// The conflicting path on disk.
        path: PathBuf,
    },

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The completion trigger was dropped before it fired.
    #[error("completion signal dropped before it fired")]
    CompletionDropped,

    /// A pipeline task panicked or was cancelled by the runtime.
    #[error("extraction task failed: {0}")]
    TaskFailed(String),
}

impl ExtractionError {
    /// Returns `true` if the error originates from the source side of the
    /// pipe (opening or reading the archive file).
    ///
    /// # Examples
    ///
    /// ```
    /// use unpipe_core::ExtractionError;
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractionError::SourceOpen {
    ///     path: PathBuf::from("missing.zip"),
    ///     source: std::io::Error::from(std::io::ErrorKind::NotFound),
    /// };
    /// assert!(err.is_source_error());
    /// ```
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        matches!(self, Self::SourceOpen { .. })
    }

    /// Returns `true` if the error was raised by the extraction sink.
    #[must_use]
    pub const fn is_sink_error(&self) -> bool {
        matches!(
            self,
            Self::DestinationInvalid { .. } | Self::InvalidArchive(_) | Self::AlreadyExists { .. }
        )
    }
}

impl From<zip::result::ZipError> for ExtractionError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}
