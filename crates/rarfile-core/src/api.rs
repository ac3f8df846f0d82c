//! High-level public API for one-shot archive operations.

use std::path::Path;

use tracing::debug;

use crate::Result;
use crate::archive::RarFile;
use crate::catalog::Catalog;
use crate::config::ArchiveConfig;
use crate::config::Password;
use crate::extraction::TestFailure;
use crate::native::Decoder;
use crate::native::OpenMode;
use crate::native::UnrarDecoder;
use crate::report::ExtractionReport;
use crate::session::Session;

/// Checks whether `path` opens as a RAR archive.
///
/// Opens the archive in [`OpenMode::ListIncludeSplitVolumes`] and closes it
/// again without reading any header. Never fails: every error, including a
/// missing file, yields `false`.
///
/// # Examples
///
/// ```no_run
/// use rarfile_core::is_valid_archive;
///
/// if is_valid_archive("download.rar") {
///     println!("looks like a RAR archive");
/// }
/// ```
#[must_use]
pub fn is_valid_archive<P: AsRef<Path>>(path: P) -> bool {
    is_valid_archive_with(&UnrarDecoder::new(), path.as_ref())
}

/// [`is_valid_archive`] through a caller-supplied decoder.
#[must_use]
pub fn is_valid_archive_with<D: Decoder + ?Sized>(decoder: &D, path: &Path) -> bool {
    match Session::open(decoder, path, OpenMode::ListIncludeSplitVolumes, None, 0) {
        Ok(session) => {
            if let Err(err) = session.close() {
                debug!(archive = %path.display(), error = %err, "close after probe failed");
            }
            true
        }
        Err(err) => {
            debug!(archive = %path.display(), error = %err, "not a RAR archive");
            false
        }
    }
}

/// Lists an archive.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or listed.
///
/// # Examples
///
/// ```no_run
/// use rarfile_core::list_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = list_archive("archive.rar")?;
/// for name in catalog.namelist() {
///     println!("{name}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_archive<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    Catalog::load(&UnrarDecoder::new(), path.as_ref(), &ArchiveConfig::default())
}

/// Tests every member of an archive.
///
/// Returns the first failing member, or `None` if the archive is intact.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or listed.
pub fn test_archive<P: AsRef<Path>>(path: P) -> Result<Option<TestFailure>> {
    RarFile::open(path)?.testrar()
}

/// Extracts every member of an archive into `output_dir`.
///
/// # Arguments
///
/// * `archive_path` - Path to the archive (first volume for multi-volume sets)
/// * `output_dir` - Directory the members are extracted into
/// * `password` - Password for encrypted archives
///
/// # Errors
///
/// Returns an error if the archive cannot be opened, listed or extracted.
/// Members written before a failure are left in place.
///
/// # Examples
///
/// ```no_run
/// use rarfile_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_archive("archive.rar", "/tmp/output", None)?;
/// println!("Extracted {} members", report.members_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    password: Option<&Password>,
) -> Result<ExtractionReport> {
    let mut config = ArchiveConfig::default();
    if let Some(password) = password {
        config.password = Some(password.clone());
    }
    let archive = RarFile::open_with(archive_path, config)?;
    archive.extractall(Some(output_dir.as_ref()), None, None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::native::ResultCode;
    use crate::test_utils::Call;
    use crate::test_utils::ScriptedDecoder;

    #[test]
    fn test_is_valid_archive_opens_and_closes() {
        let decoder = ScriptedDecoder::new().add_member("a.txt", b"a");
        assert!(is_valid_archive_with(&decoder, Path::new("ok.rar")));
        assert_eq!(
            decoder.calls(),
            vec![Call::Open(OpenMode::ListIncludeSplitVolumes), Call::Close]
        );
    }

    #[test]
    fn test_is_valid_archive_false_on_open_failure() {
        let decoder = ScriptedDecoder::new().with_open_result(ResultCode::BAD_ARCHIVE);
        assert!(!is_valid_archive_with(&decoder, Path::new("junk.bin")));
        assert_eq!(decoder.open_handles(), 0);
    }

    #[test]
    fn test_is_valid_archive_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(!is_valid_archive(temp.path().join("missing.rar")));
    }

    #[test]
    fn test_list_archive_rejects_non_rar() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("plain.txt");
        std::fs::write(&path, b"just some text").unwrap();
        assert!(list_archive(&path).is_err());
    }
}
