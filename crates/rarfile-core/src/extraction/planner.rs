//! Replays the header stream in extraction mode.

use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::info;

use super::MemberSelection;
use super::TestFailure;
use crate::RarError;
use crate::Result;
use crate::catalog::Catalog;
use crate::config::ArchiveConfig;
use crate::config::Password;
use crate::native::Action;
use crate::native::Decoder;
use crate::native::OpenMode;
use crate::report::ExtractionReport;
use crate::report::ProgressCallback;
use crate::session::Session;

/// Runs extraction and test passes over one archive.
///
/// Every pass opens its own handle in [`OpenMode::Extract`] and closes it
/// before returning, on success and on failure.
#[derive(Debug)]
pub struct Planner<'a, D: Decoder + ?Sized> {
    decoder: &'a D,
    archive: &'a Path,
    config: &'a ArchiveConfig,
    catalog: &'a Catalog,
}

impl<'a, D: Decoder + ?Sized> Planner<'a, D> {
    /// Creates a planner for `archive`, whose members are listed in
    /// `catalog`.
    #[must_use]
    pub const fn new(
        decoder: &'a D,
        archive: &'a Path,
        config: &'a ArchiveConfig,
        catalog: &'a Catalog,
    ) -> Self {
        Self {
            decoder,
            archive,
            config,
            catalog,
        }
    }

    /// Extracts the selected members into `dest` (the working directory
    /// when `None`) and skips the rest.
    ///
    /// `password` overrides the session default from the configuration.
    ///
    /// # Errors
    ///
    /// - [`RarError::NotFound`] if a selected name is not in the catalog; no
    ///   native call is made in that case.
    /// - [`RarError::ArchiveOpen`] if the archive cannot be re-opened.
    /// - [`RarError::BadArchive`] if a header read or member extraction
    ///   fails. Members written before the failure stay on disk.
    pub fn extract_members(
        &self,
        selection: &MemberSelection,
        dest: Option<&Path>,
        password: Option<&Password>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        self.check_selection(selection)?;

        let start = Instant::now();
        let total = self.catalog.count_selected(selection);
        let password = self.config.effective_password(password);

        let mut session =
            Session::open(self.decoder, self.archive, OpenMode::Extract, password, 0)?;
        let mut report = ExtractionReport::new();
        self.warn_repeated_names(selection, &mut report);
        let mut current = 0;

        loop {
            let step = session
                .advance(
                    |entry| {
                        if selection.contains(&entry.filename) {
                            current += 1;
                            progress.on_entry_start(&entry.filename, total, current);
                            Action::Extract
                        } else {
                            Action::Skip
                        }
                    },
                    dest,
                )
                .map_err(RarError::into_bad_archive)?;
            let Some(step) = step else {
                break;
            };

            if step.action == Action::Extract {
                let size = step.entry.uncompressed_size;
                progress.on_bytes_written(size);
                progress.on_entry_complete(&step.entry.filename);

                report.members_extracted += 1;
                if step.entry.is_directory() {
                    report.directories_created += 1;
                }
                report.bytes_extracted = report.bytes_extracted.saturating_add(size);
                report.extracted.push(step.entry.filename);
            } else {
                report.members_skipped += 1;
            }
        }
        session.close()?;

        report.duration = start.elapsed();
        progress.on_complete();
        info!(
            archive = %self.archive.display(),
            extracted = report.members_extracted,
            skipped = report.members_skipped,
            "extraction finished"
        );
        Ok(report)
    }

    /// Tests every member and stops at the first one that fails.
    ///
    /// # Errors
    ///
    /// Returns [`RarError::ArchiveOpen`] if the archive cannot be opened and
    /// [`RarError::Close`] if releasing the handle fails after a clean pass.
    /// Member failures are not errors; they are returned as
    /// [`TestFailure`].
    pub fn test_all(&self, password: Option<&Password>) -> Result<Option<TestFailure>> {
        let password = self.config.effective_password(password);
        let mut session =
            Session::open(self.decoder, self.archive, OpenMode::Extract, password, 0)?;

        let mut last_read: Option<String> = None;
        loop {
            match session.advance(|_| Action::Test, None) {
                Ok(Some(step)) => {
                    debug!(member = %step.entry.filename, "member ok");
                    last_read = Some(step.entry.filename);
                }
                Ok(None) => break,
                Err(err) => {
                    let failure = self.attribute(err, last_read)?;
                    info!(
                        archive = %self.archive.display(),
                        member = %failure.name,
                        kind = %failure.kind,
                        "test failed"
                    );
                    return Ok(Some(failure));
                }
            }
        }

        session.close()?;
        Ok(None)
    }

    /// Names the member a failure belongs to. A header read failure goes to
    /// the last member read, or to the archive when none was.
    fn attribute(&self, err: RarError, last_read: Option<String>) -> Result<TestFailure> {
        match err {
            RarError::Process {
                member, code, kind, ..
            } => Ok(TestFailure {
                name: member,
                kind,
                code,
            }),
            RarError::ArchiveRead { code, kind, .. } => Ok(TestFailure {
                name: last_read.unwrap_or_else(|| self.archive.display().to_string()),
                kind,
                code,
            }),
            other => Err(other),
        }
    }

    /// A selected name held by several headers (split volumes, appended
    /// duplicates) extracts every one of them, later ones overwriting
    /// earlier ones on disk.
    fn warn_repeated_names(&self, selection: &MemberSelection, report: &mut ExtractionReport) {
        let MemberSelection::Only(names) = selection else {
            return;
        };

        let mut names: Vec<&String> = names.iter().collect();
        names.sort();
        for name in names {
            let count = self.catalog.getinfo_all(name).len();
            if count > 1 {
                report.add_warning(format!(
                    "'{name}' occurs {count} times in the archive; every occurrence is extracted"
                ));
            }
        }
    }

    fn check_selection(&self, selection: &MemberSelection) -> Result<()> {
        let MemberSelection::Only(names) = selection else {
            return Ok(());
        };

        let mut missing: Vec<&String> = names
            .iter()
            .filter(|name| !self.catalog.contains(name))
            .collect();
        missing.sort();
        match missing.first() {
            Some(name) => Err(RarError::NotFound {
                name: (*name).clone(),
            }),
            None => Ok(()),
        }
    }
}
