//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use unpipe_core::Extractor;

pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let config = args.to_config();
    debug!("extract config: {config:?}");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let progress = show_progress.then(|| Arc::new(CliProgress::new("Extracting")));
    let mut extractor = Extractor::new(config);
    if let Some(progress) = &progress {
        extractor = extractor.with_progress(Arc::clone(progress) as _);
    }

    let (signal, outcome) = runtime.block_on(async {
        let (completion, outcome) = extractor.spawn(&args.archive, &output_dir).into_parts();
        let signal = completion.await;
        (signal, outcome.await)
    });

    if let Some(progress) = &progress {
        progress.finish();
    }

    match signal {
        Ok(()) => formatter.format_completion(&args.archive),
        // The outcome below explains why; only surface the missing signal when
        // the extraction otherwise succeeded.
        Err(e) if outcome.is_ok() => formatter.format_warning(&e.to_string()),
        Err(_) => {}
    }

    let report = add_archive_context(outcome, &args.archive)?;
    formatter.format_extraction_result(&report)
}
