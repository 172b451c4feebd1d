//! Blocking `Read` adapter over the chunk channel.
//!
//! The source task pushes owned chunks into a bounded Tokio channel. Sinks
//! parse archives with blocking readers, so the receiving end is wrapped in a
//! `Read` implementation that pulls the next chunk with `blocking_recv`.
//!
//! A `ChunkReader` must only be driven from a thread that is not running an
//! async runtime (for example inside `tokio::task::spawn_blocking`).

use std::io::Read;

use tokio::sync::mpsc;

/// One unit of data handed from the source to the sink.
pub type Chunk = Vec<u8>;

/// Reads the bytes of consecutive chunks as one contiguous stream.
///
/// EOF is reported once the channel is empty and every sender has been
/// dropped.
#[derive(Debug)]
pub struct ChunkReader {
    rx: mpsc::Receiver<Chunk>,
    current: Chunk,
    pos: usize,
    bytes_consumed: u64,
}

impl ChunkReader {
    /// Wraps the receiving half of a chunk channel.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<Chunk>) -> Self {
        Self {
            rx,
            current: Vec::new(),
            pos: 0,
            bytes_consumed: 0,
        }
    }

    /// Returns the number of bytes handed out through `read` so far.
    #[must_use]
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Reads and discards everything left in the stream.
    ///
    /// Used after a sink has seen its last entry so the source can run to
    /// EOF instead of being cut off.
    pub fn drain(&mut self) -> u64 {
        let mut discarded = (self.current.len() - self.pos) as u64;
        self.current.clear();
        self.pos = 0;
        while let Some(chunk) = self.rx.blocking_recv() {
            discarded += chunk.len() as u64;
        }
        self.bytes_consumed += discarded;
        discarded
    }

    /// Refills `current` from the channel. Returns `false` at EOF.
    fn fill(&mut self) -> bool {
        while self.pos >= self.current.len() {
            match self.rx.blocking_recv() {
                Some(chunk) => {
                    self.current = chunk;
                    self.pos = 0;
                }
                None => return false,
            }
        }
        true
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() || !self.fill() {
            return Ok(0);
        }

        let available = &self.current[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        self.bytes_consumed += n as u64;
        Ok(n)
    }
}
