//! Archive types and builders.

use std::path::Path;
use std::path::PathBuf;

use crate::RarError;
use crate::Result;
use crate::catalog::Catalog;
use crate::config::ArchiveConfig;
use crate::config::Password;
use crate::extraction::MemberSelection;
use crate::extraction::Planner;
use crate::extraction::TestFailure;
use crate::header::Entry;
use crate::native::Decoder;
use crate::native::UnrarDecoder;
use crate::report::ExtractionReport;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;

/// An opened RAR archive.
///
/// Opening lists the archive once; the resulting [`Catalog`] answers every
/// metadata query. Extraction and testing re-open the archive for each call,
/// so a `RarFile` never holds a native handle between calls.
///
/// # Examples
///
/// ```no_run
/// use rarfile_core::RarFile;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = RarFile::open("photos.rar")?;
/// let entry = archive.getinfo("summer/beach.jpg")?;
/// println!("{} bytes, modified {}", entry.uncompressed_size, entry.modified_at);
///
/// archive.extract_by_name("summer/beach.jpg", Some("/tmp/out".as_ref()), None)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RarFile<D: Decoder = UnrarDecoder> {
    path: PathBuf,
    decoder: D,
    config: ArchiveConfig,
    catalog: Catalog,
}

impl RarFile<UnrarDecoder> {
    /// Opens and lists an archive with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RarError::ArchiveOpen`] if the file cannot be opened as a
    /// RAR archive and [`RarError::BadArchive`] if listing fails midway.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ArchiveConfig::default())
    }

    /// Opens and lists an archive with `config`.
    ///
    /// # Errors
    ///
    /// See [`RarFile::open`].
    pub fn open_with<P: AsRef<Path>>(path: P, config: ArchiveConfig) -> Result<Self> {
        Self::with_decoder(path, UnrarDecoder::new(), config)
    }

    /// Returns a builder for opening an archive.
    #[must_use]
    pub fn builder() -> RarFileBuilder {
        RarFileBuilder::new()
    }
}

impl<D: Decoder> RarFile<D> {
    /// Opens and lists an archive through `decoder`.
    ///
    /// # Errors
    ///
    /// See [`RarFile::open`].
    pub fn with_decoder<P: AsRef<Path>>(
        path: P,
        decoder: D,
        config: ArchiveConfig,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let catalog = Catalog::load(&decoder, &path, &config)?;
        Ok(Self {
            path,
            decoder,
            config,
            catalog,
        })
    }

    /// Returns the path to the archive file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration the archive was opened with.
    #[must_use]
    pub const fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Returns the member catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the decoder.
    #[must_use]
    pub const fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Member names in archive order.
    #[must_use]
    pub fn namelist(&self) -> Vec<&str> {
        self.catalog.namelist()
    }

    /// Member entries in archive order.
    #[must_use]
    pub fn infolist(&self) -> &[Entry] {
        self.catalog.infolist()
    }

    /// Looks up a member by name.
    ///
    /// # Errors
    ///
    /// Returns [`RarError::NotFound`] if no member has this name.
    pub fn getinfo(&self, name: &str) -> Result<&Entry> {
        self.catalog.getinfo(name)
    }

    /// Every member with this name, in archive order.
    #[must_use]
    pub fn getinfo_all(&self, name: &str) -> Vec<&Entry> {
        self.catalog.getinfo_all(name)
    }

    /// Archive comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.catalog.comment()
    }

    /// Extracts the member called `name` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`RarError::NotFound`] for unknown names (before touching the
    /// archive) and [`RarError::BadArchive`] if extraction fails.
    pub fn extract_by_name(
        &self,
        name: &str,
        dest: Option<&Path>,
        password: Option<&Password>,
    ) -> Result<ExtractionReport> {
        self.planner().extract_members(
            &MemberSelection::only([name]),
            dest,
            password,
            &mut NoopProgress,
        )
    }

    /// Extracts the member described by `entry` into `dest`.
    ///
    /// # Errors
    ///
    /// See [`RarFile::extract_by_name`].
    pub fn extract_entry(
        &self,
        entry: &Entry,
        dest: Option<&Path>,
        password: Option<&Password>,
    ) -> Result<ExtractionReport> {
        self.extract_by_name(&entry.filename, dest, password)
    }

    /// Extracts `members` (every member when `None`) into `dest`.
    ///
    /// # Errors
    ///
    /// See [`RarFile::extract_by_name`].
    pub fn extractall(
        &self,
        dest: Option<&Path>,
        members: Option<&[&str]>,
        password: Option<&Password>,
    ) -> Result<ExtractionReport> {
        self.extractall_with_progress(dest, members, password, &mut NoopProgress)
    }

    /// Like [`RarFile::extractall`], reporting each member to `progress`.
    ///
    /// # Errors
    ///
    /// See [`RarFile::extract_by_name`].
    pub fn extractall_with_progress(
        &self,
        dest: Option<&Path>,
        members: Option<&[&str]>,
        password: Option<&Password>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let selection = members.map_or(MemberSelection::All, |names| {
            MemberSelection::only(names.iter().copied())
        });
        self.planner()
            .extract_members(&selection, dest, password, progress)
    }

    /// Tests every member with the session default password.
    ///
    /// Returns the first failing member, or `None` if all members decode
    /// cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`RarError::ArchiveOpen`] if the archive cannot be re-opened.
    pub fn testrar(&self) -> Result<Option<TestFailure>> {
        self.testrar_with_password(None)
    }

    /// Like [`RarFile::testrar`] with a call-site password.
    ///
    /// # Errors
    ///
    /// See [`RarFile::testrar`].
    pub fn testrar_with_password(
        &self,
        password: Option<&Password>,
    ) -> Result<Option<TestFailure>> {
        self.planner().test_all(password)
    }

    fn planner(&self) -> Planner<'_, D> {
        Planner::new(&self.decoder, &self.path, &self.config, &self.catalog)
    }
}

/// Builder for opening an archive.
///
/// # Examples
///
/// ```no_run
/// use rarfile_core::ArchiveConfig;
/// use rarfile_core::OpenMode;
/// use rarfile_core::RarFileBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = RarFileBuilder::new()
///     .archive("backup.part1.rar")
///     .password("secret")
///     .config(ArchiveConfig::default().with_listing_mode(OpenMode::List))
///     .open()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RarFileBuilder {
    archive_path: Option<PathBuf>,
    password: Option<Password>,
    config: Option<ArchiveConfig>,
}

impl RarFileBuilder {
    /// Creates a new `RarFileBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive file path.
    #[must_use]
    pub fn archive<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.archive_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the session default password. Takes precedence over a password
    /// in the configuration.
    #[must_use]
    pub fn password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: ArchiveConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Opens the archive with the native decoder.
    ///
    /// # Errors
    ///
    /// Returns [`RarError::InvalidConfiguration`] if no archive path was set,
    /// otherwise the errors of [`RarFile::open`].
    pub fn open(self) -> Result<RarFile> {
        self.open_with_decoder(UnrarDecoder::new())
    }

    /// Opens the archive with `decoder`.
    ///
    /// # Errors
    ///
    /// See [`RarFileBuilder::open`].
    pub fn open_with_decoder<D: Decoder>(self, decoder: D) -> Result<RarFile<D>> {
        let archive_path = self
            .archive_path
            .ok_or_else(|| RarError::InvalidConfiguration {
                reason: "archive path not set".to_string(),
            })?;

        let mut config = self.config.unwrap_or_default();
        if let Some(password) = self.password {
            config.password = Some(password);
        }

        RarFile::with_decoder(archive_path, decoder, config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::Call;
    use crate::test_utils::ScriptedDecoder;

    fn scripted() -> ScriptedDecoder {
        ScriptedDecoder::new()
            .add_member("a.txt", b"alpha")
            .add_member("b/c.txt", b"gamma")
    }

    #[test]
    fn test_queries_make_no_native_calls() {
        let archive =
            RarFile::with_decoder("test.rar", scripted(), ArchiveConfig::default()).unwrap();
        let before = archive.decoder().call_count();

        assert_eq!(archive.namelist(), vec!["a.txt", "b/c.txt"]);
        assert_eq!(archive.infolist().len(), 2);
        assert_eq!(archive.getinfo("a.txt").unwrap().uncompressed_size, 5);
        assert!(archive.getinfo("zzz").unwrap_err().is_not_found());

        assert_eq!(archive.decoder().call_count(), before);
    }

    #[test]
    fn test_extract_entry_uses_filename() {
        let temp = tempfile::TempDir::new().unwrap();
        let archive =
            RarFile::with_decoder("test.rar", scripted(), ArchiveConfig::default()).unwrap();
        let entry = archive.getinfo("b/c.txt").unwrap().clone();

        let report = archive
            .extract_entry(&entry, Some(temp.path()), None)
            .unwrap();
        assert_eq!(report.extracted, vec!["b/c.txt"]);
        assert!(temp.path().join("b/c.txt").exists());
    }

    #[test]
    fn test_extractall_with_member_filter() {
        let temp = tempfile::TempDir::new().unwrap();
        let archive =
            RarFile::with_decoder("test.rar", scripted(), ArchiveConfig::default()).unwrap();

        let report = archive
            .extractall(Some(temp.path()), Some(&["a.txt"]), None)
            .unwrap();
        assert_eq!(report.members_extracted, 1);
        assert!(temp.path().join("a.txt").exists());
        assert!(!temp.path().join("b").exists());
    }

    #[test]
    fn test_builder_requires_path() {
        let err = RarFileBuilder::new()
            .open_with_decoder(scripted())
            .unwrap_err();
        assert!(matches!(err, RarError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_builder_password_becomes_default() {
        let archive = RarFileBuilder::new()
            .archive("test.rar")
            .password("pw")
            .open_with_decoder(scripted())
            .unwrap();

        assert_eq!(
            archive.config().password.as_ref().map(Password::as_bytes),
            Some(&b"pw"[..])
        );
        assert_eq!(archive.decoder().calls()[1], Call::SetPassword(b"pw".to_vec()));
    }

    #[test]
    fn test_testrar_with_password_override() {
        let decoder = ScriptedDecoder::new()
            .add_encrypted_member("s.txt", b"s")
            .with_password("right");
        let archive =
            RarFile::with_decoder("test.rar", decoder, ArchiveConfig::default()).unwrap();

        let failure = archive.testrar().unwrap().unwrap();
        assert!(failure.kind == crate::ErrorKind::MissingPassword);

        let right = Password::from("right");
        assert_eq!(archive.testrar_with_password(Some(&right)).unwrap(), None);
    }
}
