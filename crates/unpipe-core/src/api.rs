//! High-level entry points.

use std::path::Path;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::Extractor;
use crate::Result;
use crate::completion::Completion;

/// Extracts the zip archive at `source` into `dest`.
///
/// Returns a completion signal that fires once the source file has been
/// closed. The signal is tied to the source, not to the sink: when it fires,
/// entries may still be in flight to disk, and it fires even if the sink
/// fails. Errors are not reported through the signal; they are logged.
/// Use [`extract_archive`] or [`Extractor::spawn`] to observe them.
///
/// If `source` cannot be opened the signal is never fulfilled and resolves
/// to `ExtractionError::CompletionDropped`.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
///
/// # Examples
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// unpipe_core::extract("bundle.zip", "/tmp/bundle").await?;
/// # Ok(())
/// # }
/// ```
///
/// [`ExtractionError::CompletionDropped`]: crate::ExtractionError::CompletionDropped
pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Completion {
    extract_with_config(source, dest, &ExtractConfig::default())
}

/// Like [`extract`], with an explicit configuration.
///
/// With `CompletionPolicy::SinkFinished` the signal fires only after every
/// entry has been written.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub fn extract_with_config<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    config: &ExtractConfig,
) -> Completion {
    let (completion, _detached) = Extractor::new(config.clone())
        .spawn(source, dest)
        .into_parts();
    completion
}

/// Extracts the zip archive at `source` into `dest` and waits for the sink.
///
/// # Errors
///
/// Returns an error if the source cannot be read, the destination is not a
/// directory, the archive is invalid, or an entry cannot be written.
///
/// # Examples
///
/// ```no_run
/// use unpipe_core::ExtractConfig;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report =
///     unpipe_core::extract_archive("bundle.zip", "/tmp/bundle", &ExtractConfig::default())
///         .await?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub async fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    Extractor::new(config.clone())
        .spawn(source, dest)
        .finish()
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ExtractionError;
    use crate::test_utils::write_test_zip;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extract_archive_writes_entries() {
        let temp = TempDir::new().unwrap();
        let archive = write_test_zip(temp.path(), "a.zip", vec![("hello.txt", b"hi")]);
        let out = temp.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let report = extract_archive(&archive, &out, &ExtractConfig::default())
            .await
            .unwrap();

        assert_eq!(report.files_extracted, 1);
        assert_eq!(std::fs::read(out.join("hello.txt")).unwrap(), b"hi");
    }

    #[tokio::test]
    async fn test_extract_missing_source_never_fires() {
        let temp = TempDir::new().unwrap();
        let result = extract(temp.path().join("missing.zip"), temp.path()).await;
        assert!(matches!(result, Err(ExtractionError::CompletionDropped)));
    }
}
