//! Integration tests for unpipe-core.
//!
//! These tests run real extractions against temporary directories and
//! observe the completion signal and the filesystem.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tempfile::TempDir;
use unpipe_core::CompletionPolicy;
use unpipe_core::ExtractConfig;
use unpipe_core::ExtractionError;
use unpipe_core::Extractor;
use unpipe_core::ProgressCallback;
use unpipe_core::extract;
use unpipe_core::extract_archive;
use unpipe_core::extract_with_config;
use unpipe_core::test_utils::ZipTestBuilder;
use unpipe_core::test_utils::create_streamed_zip;
use unpipe_core::test_utils::write_test_zip;
use walkdir::WalkDir;

const SIGNAL_TIMEOUT: Duration = Duration::from_secs(10);

fn sample_entries() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("readme.txt", b"hello from the archive"),
        ("bin/tool", b"#!/bin/sh\necho tool\n"),
        ("share/doc/notes.md", b"# notes"),
    ]
}

fn make_dest(root: &Path, name: &str) -> PathBuf {
    let dest = root.join(name);
    fs::create_dir(&dest).unwrap();
    dest
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count()
}

/// Polls until `dir` holds exactly `entries`, byte for byte.
///
/// The completion signal may fire before the sink has flushed every entry,
/// so tests settle on the filesystem rather than on the signal alone.
async fn settle(dir: &Path, entries: &[(&str, &[u8])]) {
    let deadline = tokio::time::Instant::now() + SIGNAL_TIMEOUT;
    loop {
        let done = count_files(dir) == entries.len()
            && entries
                .iter()
                .all(|(name, data)| fs::read(dir.join(name)).is_ok_and(|d| d == *data));
        if done {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "destination {} never settled",
            dir.display()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_completion_fires_for_valid_archive() {
    let temp = TempDir::new().unwrap();
    let entries = sample_entries();
    let archive = write_test_zip(temp.path(), "sample.zip", entries.clone());
    let dest = make_dest(temp.path(), "out");

    let signal = tokio::time::timeout(SIGNAL_TIMEOUT, extract(&archive, &dest))
        .await
        .expect("completion timed out");
    assert!(signal.is_ok());

    settle(&dest, &entries).await;
}

#[tokio::test]
async fn test_completion_then_outcome() {
    let temp = TempDir::new().unwrap();
    let archive = write_test_zip(temp.path(), "sample.zip", sample_entries());
    let dest = make_dest(temp.path(), "out");

    let mut extraction = Extractor::new(ExtractConfig::default()).spawn(&archive, &dest);
    extraction.completion().await.unwrap();
    let report = extraction.finish().await.unwrap();

    assert_eq!(report.files_extracted, 3);
    assert!(report.warnings.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_destination_settles_after_completion() {
    let temp = TempDir::new().unwrap();
    let entries = sample_entries();
    let archive = write_test_zip(temp.path(), "sample.zip", entries.clone());
    let dest = make_dest(temp.path(), "out");

    let (completion, outcome) = Extractor::new(ExtractConfig::default())
        .spawn(&archive, &dest)
        .into_parts();

    completion.await.unwrap();
    settle(&dest, &entries).await;

    let report = outcome.await.unwrap();
    assert_eq!(report.files_extracted, entries.len());
    assert_eq!(report.bytes_read, fs::metadata(&archive).unwrap().len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_extractions_are_independent() {
    let temp = TempDir::new().unwrap();
    let first_entries: Vec<(&str, &[u8])> = vec![("first.txt", b"one"), ("a/b.txt", b"ab")];
    let second_entries: Vec<(&str, &[u8])> = vec![("second.txt", b"two")];
    let first = write_test_zip(temp.path(), "first.zip", first_entries.clone());
    let second = write_test_zip(temp.path(), "second.zip", second_entries.clone());
    let first_dest = make_dest(temp.path(), "first");
    let second_dest = make_dest(temp.path(), "second");

    let (a, b) = tokio::join!(extract(&first, &first_dest), extract(&second, &second_dest));
    a.unwrap();
    b.unwrap();

    settle(&first_dest, &first_entries).await;
    settle(&second_dest, &second_entries).await;
    assert!(!first_dest.join("second.txt").exists());
    assert!(!second_dest.join("first.txt").exists());
}

#[tokio::test]
async fn test_missing_source_never_fulfils_signal() {
    let temp = TempDir::new().unwrap();
    let dest = make_dest(temp.path(), "out");

    let (completion, outcome) = Extractor::new(ExtractConfig::default())
        .spawn(temp.path().join("does-not-exist.zip"), &dest)
        .into_parts();

    let signal = tokio::time::timeout(SIGNAL_TIMEOUT, completion)
        .await
        .expect("signal should resolve as dropped, not hang");
    assert!(matches!(signal, Err(ExtractionError::CompletionDropped)));

    let err = outcome.await.unwrap_err();
    assert!(err.is_source_error());
    assert_eq!(count_files(&dest), 0);
}

#[tokio::test]
async fn test_missing_destination_still_fires_signal() {
    let temp = TempDir::new().unwrap();
    let archive = write_test_zip(temp.path(), "sample.zip", sample_entries());
    let dest = temp.path().join("no-such-dir");

    let (completion, outcome) = Extractor::new(ExtractConfig::default())
        .spawn(&archive, &dest)
        .into_parts();

    // The sink fails, but the source still closes and fires.
    tokio::time::timeout(SIGNAL_TIMEOUT, completion)
        .await
        .expect("completion timed out")
        .unwrap();

    assert!(matches!(
        outcome.await,
        Err(ExtractionError::DestinationInvalid { .. })
    ));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_destination_is_a_file() {
    let temp = TempDir::new().unwrap();
    let archive = write_test_zip(temp.path(), "sample.zip", sample_entries());
    let dest = temp.path().join("plain-file");
    fs::write(&dest, b"not a dir").unwrap();

    let result = extract_archive(&archive, &dest, &ExtractConfig::default()).await;
    assert!(matches!(
        result,
        Err(ExtractionError::DestinationInvalid { .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_read_only_destination_still_fires_signal() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let archive = write_test_zip(temp.path(), "sample.zip", sample_entries());
    let dest = make_dest(temp.path(), "locked");
    fs::set_permissions(&dest, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users bypass mode bits, so there is nothing to observe.
    if fs::write(dest.join(".writable"), b"").is_ok() {
        return;
    }

    let (completion, outcome) = Extractor::new(ExtractConfig::default())
        .spawn(&archive, &dest)
        .into_parts();

    tokio::time::timeout(SIGNAL_TIMEOUT, completion)
        .await
        .expect("completion timed out")
        .unwrap();
    let result = outcome.await;

    fs::set_permissions(&dest, fs::Permissions::from_mode(0o755)).unwrap();
    assert!(matches!(
        result,
        Err(ExtractionError::Io(ref e)) if e.kind() == std::io::ErrorKind::PermissionDenied
    ));
    assert_eq!(count_files(&dest), 0);
}

#[tokio::test]
async fn test_empty_archive_completes() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("empty.zip");
    fs::write(&archive, ZipTestBuilder::new().build()).unwrap();
    let dest = make_dest(temp.path(), "out");

    let config = ExtractConfig::default().with_completion(CompletionPolicy::SinkFinished);
    let mut extraction = Extractor::new(config).spawn(&archive, &dest);

    tokio::time::timeout(SIGNAL_TIMEOUT, extraction.completion())
        .await
        .expect("completion timed out")
        .unwrap();
    let report = extraction.finish().await.unwrap();

    assert_eq!(report.total_items(), 0);
    assert_eq!(report.bytes_read, fs::metadata(&archive).unwrap().len());
    assert_eq!(count_files(&dest), 0);
}

#[tokio::test]
async fn test_streamed_archive_with_data_descriptors() {
    let temp = TempDir::new().unwrap();
    let body = vec![0x42_u8; 20_000];
    let entries: Vec<(&str, &[u8])> = vec![("a.txt", b"alpha"), ("dir/b.bin", &body)];
    let archive = temp.path().join("streamed.zip");
    fs::write(&archive, create_streamed_zip(entries.clone())).unwrap();
    let dest = make_dest(temp.path(), "out");

    let config = ExtractConfig::default()
        .with_chunk_size(13)
        .with_channel_capacity(2)
        .with_completion(CompletionPolicy::SinkFinished);
    extract_with_config(&archive, &dest, &config).await.unwrap();

    assert_eq!(count_files(&dest), entries.len());
    for (name, data) in &entries {
        assert_eq!(fs::read(dest.join(name)).unwrap(), *data);
    }
}

#[tokio::test]
async fn test_sink_finished_policy_orders_signal_after_writes() {
    let temp = TempDir::new().unwrap();
    let entries = sample_entries();
    let archive = write_test_zip(temp.path(), "sample.zip", entries.clone());
    let dest = make_dest(temp.path(), "out");

    let config = ExtractConfig::default().with_completion(CompletionPolicy::SinkFinished);
    extract_with_config(&archive, &dest, &config).await.unwrap();

    // No settle loop: every entry is on disk once the signal fires.
    assert_eq!(count_files(&dest), entries.len());
    for (name, data) in &entries {
        assert_eq!(fs::read(dest.join(name)).unwrap(), *data);
    }
}

#[tokio::test]
async fn test_sink_finished_policy_withholds_signal_on_failure() {
    let temp = TempDir::new().unwrap();
    let archive = write_test_zip(temp.path(), "sample.zip", sample_entries());

    let config = ExtractConfig::default().with_completion(CompletionPolicy::SinkFinished);
    let signal = extract_with_config(&archive, temp.path().join("missing"), &config).await;

    assert!(matches!(signal, Err(ExtractionError::CompletionDropped)));
}

#[tokio::test]
async fn test_corrupt_archive_reports_invalid() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("broken.zip");
    fs::write(&archive, b"PK this is not really a zip file").unwrap();
    let dest = make_dest(temp.path(), "out");

    let mut extraction = Extractor::new(ExtractConfig::default()).spawn(&archive, &dest);
    extraction.completion().await.unwrap();
    assert!(extraction.finish().await.is_err());
}

#[tokio::test]
async fn test_traversal_entries_skipped() {
    let temp = TempDir::new().unwrap();
    let dest = make_dest(temp.path(), "out");
    let archive = write_test_zip(
        temp.path(),
        "evil.zip",
        vec![("../../escaped.txt", b"gotcha"), ("safe.txt", b"ok")],
    );

    let report = extract_archive(&archive, &dest, &ExtractConfig::default())
        .await
        .unwrap();

    assert_eq!(report.entries_skipped, 1);
    assert_eq!(report.files_extracted, 1);
    assert!(!temp.path().join("escaped.txt").exists());
    assert!(dest.join("safe.txt").exists());
}

#[tokio::test]
async fn test_tiny_chunks_and_capacity() {
    let temp = TempDir::new().unwrap();
    let body = vec![0x5A_u8; 50_000];
    let data = ZipTestBuilder::new()
        .deflated()
        .add_file("big.bin", &body)
        .add_directory("empty/")
        .build();
    let archive = temp.path().join("big.zip");
    fs::write(&archive, data).unwrap();
    let dest = make_dest(temp.path(), "out");

    let config = ExtractConfig::default()
        .with_chunk_size(7)
        .with_channel_capacity(1);
    let report = extract_archive(&archive, &dest, &config).await.unwrap();

    assert_eq!(report.files_extracted, 1);
    assert_eq!(report.directories_created, 1);
    assert_eq!(fs::read(dest.join("big.bin")).unwrap(), body);
    assert!(dest.join("empty").is_dir());
}

#[tokio::test]
async fn test_progress_callbacks() {
    #[derive(Default)]
    struct Counter {
        opened: AtomicU64,
        bytes: AtomicU64,
        entries: AtomicUsize,
    }

    impl ProgressCallback for Counter {
        fn on_source_opened(&self, total_bytes: Option<u64>) {
            self.opened.store(total_bytes.unwrap_or(0), Ordering::SeqCst);
        }

        fn on_bytes_read(&self, bytes: u64) {
            self.bytes.fetch_add(bytes, Ordering::SeqCst);
        }

        fn on_entry_complete(&self, _path: &Path) {
            self.entries.fetch_add(1, Ordering::SeqCst);
        }
    }

    let temp = TempDir::new().unwrap();
    let archive = write_test_zip(temp.path(), "sample.zip", sample_entries());
    let dest = make_dest(temp.path(), "out");
    let counter = Arc::new(Counter::default());

    Extractor::new(ExtractConfig::default().with_chunk_size(64))
        .with_progress(counter.clone())
        .spawn(&archive, &dest)
        .finish()
        .await
        .unwrap();

    let len = fs::metadata(&archive).unwrap().len();
    assert_eq!(counter.opened.load(Ordering::SeqCst), len);
    assert_eq!(counter.bytes.load(Ordering::SeqCst), len);
    assert_eq!(counter.entries.load(Ordering::SeqCst), 3);
}
