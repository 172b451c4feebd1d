//! Error conversion for the CLI.
//!
//! Turns the core's typed errors into contextual `anyhow` errors with a hint
//! the user can act on.

use anyhow::anyhow;
use std::path::Path;
use unpipe_core::ExtractionError;

/// Converts an `ExtractionError` into a user-facing error about `archive`.
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    match err {
        ExtractionError::SourceOpen { path, source } => anyhow!(
            "Cannot open archive '{}': {source}\n\
             HINT: Check that the file exists and is readable.",
            path.display()
        ),
        ExtractionError::DestinationInvalid { path, reason } => anyhow!(
            "Destination '{}' is not usable: {reason}\n\
             HINT: The output directory must already exist.",
            path.display()
        ),
        ExtractionError::AlreadyExists { path } => anyhow!(
            "Refusing to overwrite '{}' while extracting '{}'\n\
             HINT: Remove the file or drop --no-overwrite.",
            path.display(),
            archive.display()
        ),
        ExtractionError::InvalidArchive(reason) => anyhow!(
            "Invalid archive '{}': {reason}\n\
             HINT: The archive may be corrupted or truncated.",
            archive.display()
        ),
        ExtractionError::Io(io_err) => anyhow!(
            "I/O error while extracting '{}': {io_err}",
            archive.display()
        ),
        ExtractionError::InvalidConfig(reason) => anyhow!("Invalid configuration: {reason}"),
        _ => anyhow::Error::from(err)
            .context(format!("Error extracting archive '{}'", archive.display())),
    }
}

/// Attaches archive context to a core result.
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}
