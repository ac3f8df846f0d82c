//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use rarfile_core::Catalog;
use rarfile_core::Entry;
use rarfile_core::ExtractionReport;
use rarfile_core::TestFailure;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct EntryOutput {
    name: String,
    modified: String,
    size: u64,
    compressed_size: u64,
    crc32: u32,
    host_os: String,
    directory: bool,
    encrypted: bool,
}

impl From<&Entry> for EntryOutput {
    fn from(entry: &Entry) -> Self {
        Self {
            name: entry.filename.clone(),
            modified: entry.modified_at.to_string(),
            size: entry.uncompressed_size,
            compressed_size: entry.compressed_size,
            crc32: entry.crc32,
            host_os: entry.origin_os.to_string(),
            directory: entry.is_directory(),
            encrypted: entry.is_encrypted(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_listing(&self, archive: &Path, catalog: &Catalog) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput {
            archive: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            comment: Option<String>,
            total_size: u64,
            entries: Vec<EntryOutput>,
        }

        let data = ListOutput {
            archive: archive.display().to_string(),
            comment: catalog.comment().map(str::to_string),
            total_size: catalog.total_size(),
            entries: catalog.infolist().iter().map(EntryOutput::from).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_test_result(&self, archive: &Path, failure: Option<&TestFailure>) -> Result<()> {
        #[derive(Serialize)]
        struct TestOutput {
            archive: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            corrupted: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            code: Option<i32>,
        }

        let data = TestOutput {
            archive: archive.display().to_string(),
            corrupted: failure.map(|f| f.name.clone()),
            code: failure.map(|f| f.code),
        };

        match failure {
            Some(failure) => Self::output(&JsonOutput::failure("test", data, failure.to_string())),
            None => Self::output(&JsonOutput::success("test", data)),
        }
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput<'a> {
            members_extracted: usize,
            members_skipped: usize,
            directories_created: usize,
            bytes_extracted: u64,
            extracted: &'a [String],
            duration_ms: u128,
            warnings: &'a [String],
        }

        let data = ExtractionOutput {
            members_extracted: report.members_extracted,
            members_skipped: report.members_skipped,
            directories_created: report.directories_created,
            bytes_extracted: report.bytes_extracted,
            extracted: &report.extracted,
            duration_ms: report.duration.as_millis(),
            warnings: &report.warnings,
        };

        Self::output(&JsonOutput::success("extract", data))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rarfile_core::native::RawHeader;

    #[test]
    fn test_entry_output_fields() {
        let entry = Entry::from_raw(&RawHeader {
            filename: "b/c.txt".into(),
            unp_size: 7,
            host_os: 3,
            file_time: 0x5A2E_6B4F,
            ..RawHeader::default()
        });

        let json = serde_json::to_value(EntryOutput::from(&entry)).unwrap();
        assert_eq!(json["name"], "b/c.txt");
        assert_eq!(json["size"], 7);
        assert_eq!(json["modified"], "2025-01-14 13:26:30");
        assert_eq!(json["host_os"], "Unix");
        assert_eq!(json["directory"], false);
    }

    #[test]
    fn test_failure_output_status() {
        let output = JsonOutput::failure("test", 1, "bad.txt: corrupt");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "bad.txt: corrupt");
    }
}
