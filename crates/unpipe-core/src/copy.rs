//! Entry body copy with a reusable buffer.
//!
//! Sinks copy many entries per archive; one `CopyBuffer` is allocated per
//! write target and reused for every entry instead of letting
//! `std::io::copy` set up its own buffer each time.

use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;

use crate::ExtractionError;
use crate::Result;

/// Buffer size used for entry copies (64 KiB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Heap buffer reused across entry copies.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Allocates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` to `writer` until EOF and returns the bytes copied.
///
/// Interrupted reads are retried.
///
/// # Errors
///
/// Returns `ExtractionError::Io` if reading or writing fails, and
/// `ExtractionError::InvalidArchive` if the byte count overflows.
///
/// # Examples
///
/// ```
/// use unpipe_core::copy::CopyBuffer;
/// use unpipe_core::copy::copy_with_buffer;
///
/// let mut buffer = CopyBuffer::new();
/// let mut out = Vec::new();
/// let n = copy_with_buffer(&mut &b"entry body"[..], &mut out, &mut buffer)?;
/// assert_eq!(n, 10);
/// # Ok::<(), unpipe_core::ExtractionError>(())
/// ```
pub fn copy_with_buffer<R, W>(reader: &mut R, writer: &mut W, buffer: &mut CopyBuffer) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractionError::Io(e)),
        };

        writer.write_all(&buffer.buf[..n])?;

        total = total
            .checked_add(n as u64)
            .ok_or_else(|| ExtractionError::InvalidArchive("entry size overflow".to_string()))?;
    }

    Ok(total)
}
