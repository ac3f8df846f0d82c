//! Error conversion utilities for CLI.
//!
//! Converts rarfile-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use rarfile_core::ErrorKind;
use rarfile_core::RarError;
use std::path::Path;

/// Converts `RarError` to user-friendly anyhow error with context
pub fn convert_rar_error(err: RarError, archive: &Path) -> anyhow::Error {
    if err.is_missing_password() {
        return anyhow!(
            "Archive '{}' is encrypted: {err}\n\
             HINT: Pass the password with --password.",
            archive.display()
        );
    }

    match err {
        RarError::ArchiveOpen {
            kind: kind @ (ErrorKind::BadArchive | ErrorKind::UnknownFormat),
            code,
            ..
        } => {
            anyhow!(
                "Cannot open '{}': {kind} (code {code})\n\
                 HINT: Check that the file is a RAR archive. For multi-volume sets pass the first volume.",
                archive.display()
            )
        }
        RarError::ArchiveOpen { code, kind, .. } => {
            anyhow!(
                "Cannot open '{}': {kind} (code {code})\n\
                 HINT: Check that the file exists and is readable.",
                archive.display()
            )
        }
        RarError::BadArchive {
            kind: kind @ (ErrorKind::CreateError | ErrorKind::WriteError),
            code,
            ..
        } => {
            anyhow!(
                "Extraction from '{}' failed: {kind} (code {code})\n\
                 HINT: Check that the destination directory is writable and has free space.",
                archive.display()
            )
        }
        RarError::BadArchive { code, kind, .. } => {
            anyhow!(
                "Bad RAR archive '{}': {kind} (code {code})\n\
                 HINT: Run `rarfile test` to find the damaged member.",
                archive.display()
            )
        }
        RarError::NotFound { name } => {
            anyhow!(
                "No member named '{name}' in '{}'\n\
                 HINT: Run `rarfile list` to see the member names.",
                archive.display()
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, RarError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_rar_error(e, archive))
}
