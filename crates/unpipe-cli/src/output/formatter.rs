//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use unpipe_core::ExtractionReport;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Reports that the completion signal fired for `archive`.
    fn format_completion(&self, archive: &Path);

    /// Format extraction result
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_output_omits_data() {
        let json = serde_json::to_string(&JsonOutput::error("extract", "boom")).unwrap();
        assert_eq!(
            json,
            r#"{"operation":"extract","status":"error","error":"boom"}"#
        );
    }

    #[test]
    fn test_success_output_omits_error() {
        let json = serde_json::to_string(&JsonOutput::success("extract", 3)).unwrap();
        assert_eq!(json, r#"{"operation":"extract","status":"success","data":3}"#);
    }
}
