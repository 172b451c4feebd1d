//! Pipeline wiring: source pump, chunk channel, and sink.

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;
use std::time::Instant;

use log::debug;
use log::warn;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::CompletionPolicy;
use crate::ExtractConfig;
use crate::ExtractionError;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::completion;
use crate::completion::Completion;
use crate::completion::Trigger;
use crate::formats::ZipSink;
use crate::sink::ArchiveSink;
use crate::source::SourcePump;
use crate::stream::ChunkReader;

/// Spawns streaming extractions with a fixed sink and configuration.
///
/// # Examples
///
/// ```no_run
/// use unpipe_core::ExtractConfig;
/// use unpipe_core::Extractor;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut extraction = Extractor::new(ExtractConfig::default()).spawn("bundle.zip", "out");
/// extraction.completion().await?;
/// let report = extraction.finish().await?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub struct Extractor<S: ArchiveSink = ZipSink> {
    sink: Arc<S>,
    config: ExtractConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl Extractor<ZipSink> {
    /// Creates an extractor for ZIP archives.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self::with_sink(ZipSink::new(), config)
    }
}

impl<S: ArchiveSink> Extractor<S> {
    /// Creates an extractor that feeds `sink`.
    #[must_use]
    pub fn with_sink(sink: S, config: ExtractConfig) -> Self {
        Self {
            sink: Arc::new(sink),
            config,
            progress: Arc::new(NoopProgress),
        }
    }

    /// Reports progress of every spawned extraction to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Returns the configuration used for spawned extractions.
    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Starts extracting `source` into `dest` on the current Tokio runtime.
    ///
    /// Returns immediately. The returned [`Extraction`] carries the
    /// completion signal and the final outcome. Dropping it does not stop
    /// the transfer.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(&self, source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Extraction {
        let source = source.as_ref().to_path_buf();
        let dest = dest.as_ref().to_path_buf();
        let (trigger, completion) = completion::pair();

        if let Err(e) = self.config.validate() {
            drop(trigger);
            return Extraction {
                completion,
                outcome: Outcome(tokio::spawn(async move { Err(e) })),
            };
        }

        let (source_trigger, sink_trigger) = match self.config.completion {
            CompletionPolicy::SourceClosed => (Some(trigger), None),
            CompletionPolicy::SinkFinished => (None, Some(trigger)),
        };

        let pipeline = Pipeline {
            sink: Arc::clone(&self.sink),
            config: self.config.clone(),
            progress: Arc::clone(&self.progress),
            source,
            dest,
        };

        debug!(
            "spawning {} extraction {} -> {}",
            self.sink.format_name(),
            pipeline.source.display(),
            pipeline.dest.display()
        );

        Extraction {
            completion,
            outcome: Outcome(tokio::spawn(pipeline.run(source_trigger, sink_trigger))),
        }
    }
}

/// One running extraction.
#[must_use = "dropping an Extraction detaches it; await its completion or outcome"]
pub struct Extraction {
    completion: Completion,
    outcome: Outcome,
}

impl Extraction {
    /// Returns the completion signal for awaiting in place.
    pub fn completion(&mut self) -> &mut Completion {
        &mut self.completion
    }

    /// Splits into the completion signal and the outcome.
    pub fn into_parts(self) -> (Completion, Outcome) {
        (self.completion, self.outcome)
    }

    /// Waits for the whole pipeline, ignoring the completion signal.
    ///
    /// # Errors
    ///
    /// Returns the source error if the source failed, otherwise the sink
    /// error.
    pub async fn finish(self) -> Result<ExtractionReport> {
        self.outcome.await
    }
}

/// Final result of an extraction, available once the sink has finished.
#[must_use = "an outcome does nothing unless awaited"]
pub struct Outcome(JoinHandle<Result<ExtractionReport>>);

impl Future for Outcome {
    type Output = Result<ExtractionReport>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx).map(|joined| {
            joined.unwrap_or_else(|e| Err(ExtractionError::TaskFailed(e.to_string())))
        })
    }
}

struct Pipeline<S> {
    sink: Arc<S>,
    config: ExtractConfig,
    progress: Arc<dyn ProgressCallback>,
    source: PathBuf,
    dest: PathBuf,
}

impl<S: ArchiveSink> Pipeline<S> {
    async fn run(
        self,
        source_trigger: Option<Trigger>,
        sink_trigger: Option<Trigger>,
    ) -> Result<ExtractionReport> {
        let started = Instant::now();
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);

        let sink = Arc::clone(&self.sink);
        let dest = self.dest.clone();
        let config = self.config.clone();
        let progress = Arc::clone(&self.progress);
        let sink_task = tokio::task::spawn_blocking(move || -> Result<ExtractionReport> {
            let mut reader = ChunkReader::new(rx);
            let report = sink
                .open(&dest, &config, progress)
                .and_then(|mut target| target.unpack(&mut reader))?;

            let trailing = reader.drain();
            debug!("sink finished, drained {trailing} trailing bytes");
            if let Some(trigger) = sink_trigger {
                trigger.fire();
            }
            Ok(report)
        });

        let mut pump = SourcePump::new(
            self.source.clone(),
            self.config.chunk_size,
            Arc::clone(&self.progress),
        );
        if let Some(trigger) = source_trigger {
            pump = pump.on_close(trigger);
        }
        let source_result = pump.run(tx).await;

        let sink_result = sink_task
            .await
            .unwrap_or_else(|e| Err(ExtractionError::TaskFailed(e.to_string())));

        let outcome = match (source_result, sink_result) {
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
            (Ok(bytes_read), Ok(mut report)) => {
                report.bytes_read = bytes_read;
                report.duration = started.elapsed();
                Ok(report)
            }
        };

        match &outcome {
            Ok(report) => debug!(
                "extracted {} into {}: {} files in {:?}",
                self.source.display(),
                self.dest.display(),
                report.files_extracted,
                report.duration
            ),
            Err(e) => warn!(
                "extracting {} into {} failed: {e}",
                self.source.display(),
                self.dest.display()
            ),
        }

        outcome
    }
}
