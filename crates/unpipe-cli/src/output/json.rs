//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io;
use std::io::Write;
use std::path::Path;
use unpipe_core::ExtractionReport;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ExtractionOutput<'a> {
    files_extracted: usize,
    directories_created: usize,
    entries_skipped: usize,
    bytes_read: u64,
    bytes_written: u64,
    duration_ms: u128,
    warnings: &'a [String],
}

impl OutputFormatter for JsonFormatter {
    // The final report carries everything, so the signal itself is not printed.
    fn format_completion(&self, _archive: &Path) {}

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        let data = ExtractionOutput {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            entries_skipped: report.entries_skipped,
            bytes_read: report.bytes_read,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: &report.warnings,
        };

        Self::output(&JsonOutput::success("extract", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let _ = Self::output(&JsonOutput::error("extract", format!("{error:#}")));
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData<'a> {
            message: &'a str,
        }

        let _ = Self::output(&JsonOutput::success("warning", WarningData { message }));
    }
}
