//! Extraction sink traits.
//!
//! A sink knows one archive format. The pipeline asks it to open a
//! [`WriteTarget`] bound to the destination directory, then hands the target
//! the byte stream coming off the source.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;

/// Factory for write targets of one archive format.
pub trait ArchiveSink: Send + Sync + 'static {
    /// Opens a write target that extracts into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be used.
    fn open(
        &self,
        dest: &Path,
        config: &ExtractConfig,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<Box<dyn WriteTarget>>;

    /// Returns the archive format name.
    fn format_name(&self) -> &str;
}

/// Consumer of an archive byte stream bound to a destination.
pub trait WriteTarget: Send {
    /// Reads archive data from `stream`, writing entries to the destination.
    ///
    /// Implementations may return before `stream` reaches EOF once the last
    /// entry has been written; the caller drains what remains.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is not a valid archive or an entry
    /// cannot be written.
    fn unpack(&mut self, stream: &mut dyn Read) -> Result<ExtractionReport>;
}
