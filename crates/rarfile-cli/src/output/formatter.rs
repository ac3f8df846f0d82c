//! Output formatter trait for CLI results.

use anyhow::Result;
use rarfile_core::Catalog;
use rarfile_core::ExtractionReport;
use rarfile_core::TestFailure;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format archive listing
    fn format_listing(&self, archive: &Path, catalog: &Catalog) -> Result<()>;

    /// Format integrity test result
    fn format_test_result(&self, archive: &Path, failure: Option<&TestFailure>) -> Result<()>;

    /// Format extraction result
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()>;
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

    /// Output for an operation that ran but found a problem; `data` still
    /// carries the details.
    pub fn failure(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}
