//! Source side of the pipe: reads the archive file into the chunk channel.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use log::trace;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use crate::ExtractionError;
use crate::ProgressCallback;
use crate::Result;
use crate::completion::Trigger;
use crate::stream::Chunk;

/// Streams a file into a chunk channel.
///
/// The source counts as closed once it stops reading for any reason after a
/// successful open: end of file, the receiving side hanging up, or a read
/// error. At that point the file handle and the sender are dropped and the
/// close trigger, if any, fires. A source that never opens never closes, so
/// the trigger is dropped unfired.
pub struct SourcePump {
    path: PathBuf,
    chunk_size: usize,
    on_close: Option<Trigger>,
    progress: Arc<dyn ProgressCallback>,
}

impl SourcePump {
    /// Creates a pump for `path` reading up to `chunk_size` bytes at a time.
    #[must_use]
    pub fn new(path: PathBuf, chunk_size: usize, progress: Arc<dyn ProgressCallback>) -> Self {
        Self {
            path,
            chunk_size,
            on_close: None,
            progress,
        }
    }

    /// Fires `trigger` when the source closes.
    #[must_use]
    pub fn on_close(mut self, trigger: Trigger) -> Self {
        self.on_close = Some(trigger);
        self
    }

    /// Runs the pump to completion and returns the number of bytes read.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::SourceOpen` if the file cannot be opened and
    /// `ExtractionError::Io` if a read fails part way through.
    pub async fn run(self, tx: mpsc::Sender<Chunk>) -> Result<u64> {
        let Self {
            path,
            chunk_size,
            on_close,
            progress,
        } = self;

        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(source) => {
                debug!("source {} failed to open: {source}", path.display());
                return Err(ExtractionError::SourceOpen { path, source });
            }
        };

        let total = file.metadata().await.ok().map(|m| m.len());
        debug!("source {} opened ({total:?} bytes)", path.display());
        progress.on_source_opened(total);

        let mut bytes_read: u64 = 0;
        let mut failure = None;

        loop {
            let mut chunk = vec![0u8; chunk_size];
            let n = match file.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };
            chunk.truncate(n);
            bytes_read += n as u64;
            progress.on_bytes_read(n as u64);
            trace!("source chunk of {n} bytes ({bytes_read} total)");

            if tx.send(chunk).await.is_err() {
                debug!("sink hung up after {bytes_read} bytes");
                break;
            }
        }

        drop(file);
        drop(tx);
        debug!("source {} closed after {bytes_read} bytes", path.display());

        if let Some(trigger) = on_close {
            trigger.fire();
        }

        match failure {
            Some(e) => Err(ExtractionError::Io(e)),
            None => Ok(bytes_read),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::completion;
    use tempfile::TempDir;

    fn pump(path: PathBuf, chunk_size: usize) -> SourcePump {
        SourcePump::new(path, chunk_size, Arc::new(NoopProgress))
    }

    #[tokio::test]
    async fn test_pump_chunks_whole_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        std::fs::write(&path, vec![9u8; 10]).unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let read = pump(path, 4).run(tx).await.unwrap();
        assert_eq!(read, 10);

        let mut sizes = Vec::new();
        while let Some(chunk) = rx.recv().await {
            sizes.push(chunk.len());
        }
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_pump_fires_on_close() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        std::fs::write(&path, b"abc").unwrap();

        let (trigger, completion) = completion::pair();
        let (tx, _rx) = mpsc::channel(8);
        pump(path, 16).on_close(trigger).run(tx).await.unwrap();
        completion.await.unwrap();
    }

    #[tokio::test]
    async fn test_pump_missing_file_never_fires() {
        let temp = TempDir::new().unwrap();
        let (trigger, completion) = completion::pair();
        let (tx, mut rx) = mpsc::channel(1);

        let result = pump(temp.path().join("missing.zip"), 16)
            .on_close(trigger)
            .run(tx)
            .await;

        assert!(matches!(result, Err(ExtractionError::SourceOpen { .. })));
        assert!(matches!(
            completion.await,
            Err(ExtractionError::CompletionDropped)
        ));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pump_closes_when_receiver_dropped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        std::fs::write(&path, vec![1u8; 1024]).unwrap();

        let (trigger, completion) = completion::pair();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let read = pump(path, 16).on_close(trigger).run(tx).await.unwrap();
        assert_eq!(read, 16);
        completion.await.unwrap();
    }
}
