//! Extraction operation reporting.

use std::time::Duration;

/// Report of an extraction pass.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of members written to disk.
    pub members_extracted: usize,

    /// Number of members skipped because they were not selected.
    pub members_skipped: usize,

    /// Directory members among the extracted ones.
    pub directories_created: usize,

    /// Total uncompressed size of the extracted members, as recorded in
    /// their headers.
    pub bytes_extracted: u64,

    /// Names of the extracted members, in archive order.
    pub extracted: Vec<String>,

    /// Duration of the extraction pass.
    pub duration: Duration,

    /// Non-fatal observations about the pass, such as a selected name that
    /// matches more than one header.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Callback trait for progress reporting during extraction and testing.
///
/// The trait requires `Send` so a progress sink can be handed to another
/// thread by the caller.
///
/// # Examples
///
/// ```
/// use rarfile_core::ProgressCallback;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, name: &str, total: usize, current: usize) {
///         println!("Processing {current}/{total}: {name}");
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, name: &str) {
///         println!("Completed: {name}");
///     }
///
///     fn on_complete(&mut self) {
///         println!("Operation complete");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before a member is decoded.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the member
    /// * `total` - Number of members the pass will decode
    /// * `current` - Current member number (1-indexed)
    fn on_entry_start(&mut self, name: &str, total: usize, current: usize);

    /// Called with the uncompressed size of a member once it was decoded.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when a member has been decoded successfully.
    fn on_entry_complete(&mut self, name: &str);

    /// Called when the whole pass finished successfully.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _name: &str, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _name: &str) {}

    fn on_complete(&mut self) {}
}
