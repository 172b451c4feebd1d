//! Tuning knobs for the extraction pipeline.

use crate::ExtractionError;
use crate::Result;

/// Default size of a single chunk pulled from the source (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default number of chunks buffered between source and sink.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Which lifecycle event fulfils the completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// Fire as soon as the source stream closes.
    ///
    /// Entries may still be in flight to disk when the signal fires, and the
    /// signal fires even if the sink later fails.
    #[default]
    SourceClosed,

    /// Fire only after the sink has written every entry successfully.
    ///
    /// If the sink fails the signal is never fulfilled.
    SinkFinished,
}

/// Configuration for a streaming extraction.
///
/// # Examples
///
/// ```
/// use unpipe_core::CompletionPolicy;
/// use unpipe_core::ExtractConfig;
///
/// let config = ExtractConfig::default()
///     .with_chunk_size(8 * 1024)
///     .with_completion(CompletionPolicy::SinkFinished);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Maximum number of bytes read from the source per chunk.
    pub chunk_size: usize,

    /// Number of chunks the channel holds before the source waits.
    pub channel_capacity: usize,

    /// Event that fulfils the completion signal.
    pub completion: CompletionPolicy,

    /// Replace files that already exist in the destination.
    pub overwrite: bool,

    /// Apply unix permission bits stored in the archive.
    pub preserve_permissions: bool,
}

impl Default for ExtractConfig {
    /// Default values:
    /// - `chunk_size`: 64 KiB
    /// - `channel_capacity`: 16
    /// - `completion`: `CompletionPolicy::SourceClosed`
    /// - `overwrite`: true
    /// - `preserve_permissions`: false
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            completion: CompletionPolicy::default(),
            overwrite: true,
            preserve_permissions: false,
        }
    }
}

impl ExtractConfig {
    /// Sets the chunk size.
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the channel capacity.
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the completion policy.
    pub const fn with_completion(mut self, completion: CompletionPolicy) -> Self {
        self.completion = completion;
        self
    }

    /// Sets whether existing files are overwritten.
    pub const fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets whether unix permissions from the archive are applied.
    pub const fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Checks that the configuration can drive a pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidConfig` if `chunk_size` or
    /// `channel_capacity` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ExtractionError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        // tokio's bounded channel panics on zero capacity
        if self.channel_capacity == 0 {
            return Err(ExtractionError::InvalidConfig(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
