//! Extraction statistics and progress observation.

use std::path::Path;
use std::time::Duration;

/// Report of a finished streaming extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory entries created.
    pub directories_created: usize,

    /// Number of entries skipped because their names escape the destination.
    pub entries_skipped: usize,

    /// Compressed bytes pulled from the source archive.
    pub bytes_read: u64,

    /// Uncompressed bytes written to disk.
    pub bytes_written: u64,

    /// Wall-clock time from spawn until the sink finished.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns the number of entries written to disk.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Observer for progress during a streaming extraction.
///
/// The source side and the sink side run on different tasks, so
/// implementations must be `Send + Sync` and take `&self`. Every method has
/// a no-op default.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use std::sync::atomic::AtomicU64;
/// use std::sync::atomic::Ordering;
/// use unpipe_core::ProgressCallback;
///
/// #[derive(Default)]
/// struct ByteCounter(AtomicU64);
///
/// impl ProgressCallback for ByteCounter {
///     fn on_bytes_read(&self, bytes: u64) {
///         self.0.fetch_add(bytes, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait ProgressCallback: Send + Sync {
    /// Called once after the source opened, with its length if known.
    fn on_source_opened(&self, _total_bytes: Option<u64>) {}

    /// Called after each chunk is read from the source.
    fn on_bytes_read(&self, _bytes: u64) {}

    /// Called after an entry has been fully written.
    fn on_entry_complete(&self, _path: &Path) {}
}

/// Progress observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {}
