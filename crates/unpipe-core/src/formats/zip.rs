//! ZIP sink backed by the `zip` crate.
//!
//! Entries are parsed from their local headers in archive order, so the
//! archive never needs to be seekable or fully buffered. An entry whose sizes
//! only follow its data in a data descriptor cannot be delimited from the
//! local header alone. From the first such entry on, the rest of the stream is
//! spooled to a temporary file and finished through the central directory.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Cursor;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use log::warn;
use zip::ZipArchive;
use zip::read::read_zipfile_from_stream;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::sink::ArchiveSink;
use crate::sink::WriteTarget;
use crate::types::DestDir;

const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_DIRECTORY_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;
const ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0606_4b50;

const LOCAL_HEADER_LEN: usize = 30;
const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// ZIP archive sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipSink;

impl ZipSink {
    /// Creates a new ZIP sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveSink for ZipSink {
    fn open(
        &self,
        dest: &Path,
        config: &ExtractConfig,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<Box<dyn WriteTarget>> {
        let dest = DestDir::new(dest)?;
        debug!("zip sink opened at {}", dest.as_path().display());
        Ok(Box::new(ZipTarget::new(dest, config, progress)))
    }

    fn format_name(&self) -> &str {
        "zip"
    }
}

/// Write target that unpacks a ZIP stream into a destination directory.
pub struct ZipTarget {
    dest: DestDir,
    overwrite: bool,
    preserve_permissions: bool,
    progress: Arc<dyn ProgressCallback>,
    buffer: CopyBuffer,
}

impl ZipTarget {
    /// Creates a target writing into `dest`.
    #[must_use]
    pub fn new(dest: DestDir, config: &ExtractConfig, progress: Arc<dyn ProgressCallback>) -> Self {
        Self {
            dest,
            overwrite: config.overwrite,
            preserve_permissions: config.preserve_permissions,
            progress,
            buffer: CopyBuffer::new(),
        }
    }

    fn write_file<R: Read + ?Sized>(
        &mut self,
        entry: &mut R,
        path: &Path,
        mode: Option<u32>,
    ) -> Result<u64> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !self.overwrite && path.exists() {
            return Err(ExtractionError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        let mut out = BufWriter::new(File::create(path)?);
        let written = copy_with_buffer(entry, &mut out, &mut self.buffer)?;
        out.flush()?;

        if self.preserve_permissions {
            apply_mode(path, mode)?;
        }

        Ok(written)
    }

    /// Writes one entry below the destination, or skips it if its name escapes.
    fn place_entry(
        &mut self,
        name: &str,
        is_dir: bool,
        mode: Option<u32>,
        body: &mut dyn Read,
        report: &mut ExtractionReport,
    ) -> Result<()> {
        let Some(path) = self.dest.join_entry(Path::new(name)) else {
            warn!("skipping entry outside destination: {name}");
            report.entries_skipped += 1;
            report.add_warning(format!("skipped entry outside destination: {name}"));
            return Ok(());
        };

        if is_dir {
            fs::create_dir_all(&path)?;
            report.directories_created += 1;
        } else {
            report.bytes_written += self.write_file(body, &path, mode)?;
            report.files_extracted += 1;
        }

        self.progress.on_entry_complete(&path);
        Ok(())
    }

    /// Copies the entry starting at `offset` and everything after it into an
    /// anonymous temporary file.
    ///
    /// The bytes before `offset` are left as a hole, so offsets recorded in
    /// the central directory still point at the right local headers.
    fn spool(
        &mut self,
        stream: &mut CountingReader<'_>,
        offset: u64,
        header: &[u8],
    ) -> Result<File> {
        let mut spool = tempfile::tempfile()?;
        spool.seek(SeekFrom::Start(offset))?;
        spool.write_all(header)?;
        let copied = copy_with_buffer(stream, &mut spool, &mut self.buffer)?;
        debug!("spooled {} bytes from offset {offset}", copied + header.len() as u64);
        Ok(spool)
    }

    /// Extracts the entries of a spooled archive whose local headers start at
    /// or after `offset`. Earlier entries were already written from the stream.
    fn unpack_spooled(
        &mut self,
        spool: File,
        offset: u64,
        report: &mut ExtractionReport,
    ) -> Result<()> {
        let mut archive = ZipArchive::new(spool)?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.header_start() < offset {
                continue;
            }

            let name = entry.name().to_string();
            let is_dir = entry.is_dir();
            let mode = entry.unix_mode();
            self.place_entry(&name, is_dir, mode, &mut entry, report)?;
        }

        Ok(())
    }
}

impl WriteTarget for ZipTarget {
    fn unpack(&mut self, stream: &mut dyn Read) -> Result<ExtractionReport> {
        let mut report = ExtractionReport::new();
        let mut stream = CountingReader::new(stream);

        loop {
            let offset = stream.count;
            let Some(header) = next_local_header(&mut stream)? else {
                break;
            };

            if uses_data_descriptor(&header) {
                debug!("entry at offset {offset} has a data descriptor, spooling the rest");
                let spool = self.spool(&mut stream, offset, &header)?;
                self.unpack_spooled(spool, offset, &mut report)?;
                break;
            }

            let mut replay = Cursor::new(header).chain(&mut stream);
            let Some(mut entry) = read_zipfile_from_stream(&mut replay)? else {
                break;
            };

            let name = entry.name().to_string();
            let is_dir = entry.is_dir();
            let mode = entry.unix_mode();
            self.place_entry(&name, is_dir, mode, &mut entry, &mut report)?;
        }

        debug!(
            "zip stream finished: {} files, {} directories",
            report.files_extracted, report.directories_created
        );
        Ok(report)
    }
}

/// Counts the bytes pulled through it, giving the archive offset of the
/// next record.
struct CountingReader<'a> {
    inner: &'a mut dyn Read,
    count: u64,
}

impl<'a> CountingReader<'a> {
    fn new(inner: &'a mut dyn Read) -> Self {
        Self { inner, count: 0 }
    }
}

impl Read for CountingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// Reads the next record signature and, for a local file header, the rest of
/// the fixed-size header.
///
/// Returns `None` once the entries are over: at a central directory or
/// end-of-central-directory record, or at a clean end of stream.
fn next_local_header<R: Read + ?Sized>(
    stream: &mut R,
) -> Result<Option<[u8; LOCAL_HEADER_LEN]>> {
    let mut header = [0u8; LOCAL_HEADER_LEN];
    if !fill_or_eof(stream, &mut header[..4])? {
        return Ok(None);
    }

    match u32::from_le_bytes([header[0], header[1], header[2], header[3]]) {
        LOCAL_FILE_HEADER_SIGNATURE => {
            if !fill_or_eof(stream, &mut header[4..])? {
                return Err(ExtractionError::InvalidArchive(
                    "truncated local file header".to_string(),
                ));
            }
            Ok(Some(header))
        }
        CENTRAL_DIRECTORY_HEADER_SIGNATURE
        | END_OF_CENTRAL_DIRECTORY_SIGNATURE
        | ZIP64_END_OF_CENTRAL_DIRECTORY_SIGNATURE => Ok(None),
        other => Err(ExtractionError::InvalidArchive(format!(
            "unexpected record signature {other:#010x}"
        ))),
    }
}

/// Fills `buf` completely. Returns `false` if the stream ended before the
/// first byte; ending part way is an invalid archive.
fn fill_or_eof<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(ExtractionError::InvalidArchive(
                    "archive ends inside a record header".to_string(),
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(ExtractionError::Io(e)),
        }
    }
    Ok(true)
}

fn uses_data_descriptor(header: &[u8; LOCAL_HEADER_LEN]) -> bool {
    u16::from_le_bytes([header[6], header[7]]) & FLAG_DATA_DESCRIPTOR != 0
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}
