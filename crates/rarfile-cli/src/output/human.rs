//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use rarfile_core::Catalog;
use rarfile_core::Entry;
use rarfile_core::ExtractionReport;
use rarfile_core::TestFailure;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn listing_header() -> String {
        format!("{:<46} {:>19} {:>12}", "File Name", "Modified    ", "Size")
    }

    fn listing_row(entry: &Entry) -> String {
        format!(
            "{:<46} {} {:>12}",
            entry.filename, entry.modified_at, entry.uncompressed_size
        )
    }

    fn corrupted_line(failure: &TestFailure) -> String {
        format!(
            "The following enclosed file is corrupted: '{}'",
            failure.name
        )
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_listing(&self, archive: &Path, catalog: &Catalog) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if let Some(comment) = catalog.comment() {
            let _ = self.term.write_line(comment);
            let _ = self.term.write_line("");
        }

        let _ = self.term.write_line(&Self::listing_header());
        for entry in catalog.infolist() {
            let _ = self.term.write_line(&Self::listing_row(entry));
        }

        if self.verbose {
            let _ = self.term.write_line("");
            let _ = self.term.write_line(&format!(
                "{}: {} members, {}",
                archive.display(),
                catalog.len(),
                Self::format_size(catalog.total_size())
            ));
        }

        Ok(())
    }

    fn format_test_result(&self, archive: &Path, failure: Option<&TestFailure>) -> Result<()> {
        // Corruption is always reported, even in quiet mode
        if let Some(failure) = failure {
            if self.use_colors {
                let _ = self.term.write_line(&format!(
                    "{} {}",
                    style("✗").red().bold(),
                    Self::corrupted_line(failure)
                ));
            } else {
                let _ = self.term.write_line(&Self::corrupted_line(failure));
            }
            if self.verbose {
                let _ = self
                    .term
                    .write_line(&format!("  {} (code {})", failure.kind, failure.code));
            }
        }

        if self.quiet {
            return Ok(());
        }

        if self.verbose && failure.is_none() {
            let _ = self
                .term
                .write_line(&format!("{}: all members OK", archive.display()));
        }
        let _ = self.term.write_line("Done testing");

        Ok(())
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Extraction complete",
                style("✓").green().bold()
            ));
        } else {
            let _ = self.term.write_line("Extraction complete");
        }

        let _ = self
            .term
            .write_line(&format!("  Members extracted: {}", report.members_extracted));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_created));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_extracted)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Members skipped: {}", report.members_skipped));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
            for name in &report.extracted {
                let _ = self.term.write_line(&format!("    {name}"));
            }
        }

        if report.has_warnings() {
            let _ = self.term.write_line("");
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                let _ = self.term.write_line("Warnings:");
            }
            for warning in &report.warnings {
                let _ = self.term.write_line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }
}
