//! Streaming zip extraction with a single-fire completion signal.
//!
//! `unpipe-core` opens an archive as a byte stream, pipes it through a
//! bounded channel into an extraction sink bound to a destination directory,
//! and hands back a [`Completion`] that fires when the source stream closes.
//!
//! The signal follows the source, not the sink. Under the default
//! [`CompletionPolicy::SourceClosed`] it can fire before the last entry is
//! on disk, and it fires even when the sink fails. Choose
//! [`CompletionPolicy::SinkFinished`] to wait for the sink instead, or await
//! the [`Outcome`] of an [`Extraction`] for the full result.
//!
//! # Examples
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! unpipe_core::extract("bundle.zip", "/tmp/bundle").await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod completion;
pub mod config;
pub mod copy;
pub mod error;
pub mod extractor;
pub mod formats;
pub mod report;
pub mod sink;
pub mod source;
pub mod stream;
#[doc(hidden)]
pub mod test_utils;
pub mod types;

pub use api::extract;
pub use api::extract_archive;
pub use api::extract_with_config;
pub use completion::Completion;
pub use config::CompletionPolicy;
pub use config::ExtractConfig;
pub use error::ExtractionError;
pub use error::Result;
pub use extractor::Extraction;
pub use extractor::Extractor;
pub use extractor::Outcome;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use sink::ArchiveSink;
pub use sink::WriteTarget;
