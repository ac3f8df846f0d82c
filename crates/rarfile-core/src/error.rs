//! Error types for archive reading, testing and extraction.

use std::path::PathBuf;
use thiserror::Error;

use crate::native::ResultCode;

/// Result type alias using `RarError`.
pub type Result<T> = std::result::Result<T, RarError>;

/// Failure category reported by the native decoder.
///
/// Every native result code other than success and end-of-archive maps to
/// exactly one kind. Codes the taxonomy does not know become
/// [`ErrorKind::Unknown`]; the raw code stays available on the error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Not enough memory to initialize data structures.
    NoMemory,
    /// Archive header or data is broken (includes CRC mismatches).
    BadData,
    /// File is not a valid RAR archive.
    BadArchive,
    /// Unknown encryption used for archive headers.
    UnknownFormat,
    /// Archive or volume open error.
    OpenError,
    /// Destination file could not be created.
    CreateError,
    /// Archive or file close error.
    CloseError,
    /// Read error.
    ReadError,
    /// Write error.
    WriteError,
    /// Comment buffer too small, comment truncated.
    SmallBuffer,
    /// Encrypted member and no (or an incorrect) password supplied.
    MissingPassword,
    /// Any code the taxonomy does not map.
    Unknown,
}

impl ErrorKind {
    /// Maps a native failure code to its kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use rarfile_core::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::from_code(12), ErrorKind::BadData);
    /// assert_eq!(ErrorKind::from_code(22), ErrorKind::MissingPassword);
    /// assert_eq!(ErrorKind::from_code(99), ErrorKind::Unknown);
    /// ```
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match ResultCode(code) {
            ResultCode::NO_MEMORY => Self::NoMemory,
            ResultCode::BAD_DATA => Self::BadData,
            ResultCode::BAD_ARCHIVE => Self::BadArchive,
            ResultCode::UNKNOWN_FORMAT => Self::UnknownFormat,
            ResultCode::OPEN_ERROR => Self::OpenError,
            ResultCode::CREATE_ERROR => Self::CreateError,
            ResultCode::CLOSE_ERROR => Self::CloseError,
            ResultCode::READ_ERROR => Self::ReadError,
            ResultCode::WRITE_ERROR => Self::WriteError,
            ResultCode::SMALL_BUFFER => Self::SmallBuffer,
            ResultCode::MISSING_PASSWORD | ResultCode::BAD_PASSWORD => Self::MissingPassword,
            _ => Self::Unknown,
        }
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoMemory => "not enough memory",
            Self::BadData => "archive data is corrupt",
            Self::BadArchive => "not a valid RAR archive",
            Self::UnknownFormat => "unknown archive encryption",
            Self::OpenError => "archive or volume could not be opened",
            Self::CreateError => "destination file could not be created",
            Self::CloseError => "archive could not be closed",
            Self::ReadError => "read error",
            Self::WriteError => "write error",
            Self::SmallBuffer => "comment buffer too small",
            Self::MissingPassword => "missing or incorrect password",
            Self::Unknown => "unknown error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Errors that can occur while reading a RAR archive.
#[derive(Error, Debug)]
pub enum RarError {
    /// The native open call failed or returned no handle.
    #[error("cannot open archive {path}: {kind} (code {code})")]
    ArchiveOpen {
        /// Archive path.
        path: PathBuf,
        /// Raw native result code.
        code: i32,
        /// Mapped failure kind.
        kind: ErrorKind,
    },

    /// Reading the next member header failed.
    #[error("cannot read header in {path}: {kind} (code {code})")]
    ArchiveRead {
        /// Archive path.
        path: PathBuf,
        /// Raw native result code.
        code: i32,
        /// Mapped failure kind.
        kind: ErrorKind,
    },

    /// Skipping, testing or extracting the current member failed.
    #[error("cannot process {member:?} in {path}: {kind} (code {code})")]
    Process {
        /// Archive path.
        path: PathBuf,
        /// Name of the member being processed.
        member: String,
        /// Raw native result code.
        code: i32,
        /// Mapped failure kind.
        kind: ErrorKind,
    },

    /// Closing the native handle failed.
    #[error("cannot close archive {path}: {kind} (code {code})")]
    Close {
        /// Archive path.
        path: PathBuf,
        /// Raw native result code.
        code: i32,
        /// Mapped failure kind.
        kind: ErrorKind,
    },

    /// The archive stream broke during a listing or extraction pass.
    #[error("bad RAR archive {path}: {kind} (code {code})")]
    BadArchive {
        /// Archive path.
        path: PathBuf,
        /// Raw native result code.
        code: i32,
        /// Mapped failure kind.
        kind: ErrorKind,
    },

    /// No member with the given name exists in the catalog.
    #[error("there is no item named {name:?} in the archive")]
    NotFound {
        /// Requested member name.
        name: String,
    },

    /// The caller supplied an incomplete or inconsistent configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong.
        reason: String,
    },
}

impl RarError {
    /// Returns the failure kind for errors that come from the native layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use rarfile_core::ErrorKind;
    /// use rarfile_core::RarError;
    ///
    /// let err = RarError::NotFound { name: "a.txt".into() };
    /// assert_eq!(err.kind(), None);
    ///
    /// let err = RarError::BadArchive {
    ///     path: "x.rar".into(),
    ///     code: 22,
    ///     kind: ErrorKind::MissingPassword,
    /// };
    /// assert_eq!(err.kind(), Some(ErrorKind::MissingPassword));
    /// ```
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::ArchiveOpen { kind, .. }
            | Self::ArchiveRead { kind, .. }
            | Self::Process { kind, .. }
            | Self::Close { kind, .. }
            | Self::BadArchive { kind, .. } => Some(*kind),
            Self::NotFound { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    /// Returns the raw native result code, if any.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::ArchiveOpen { code, .. }
            | Self::ArchiveRead { code, .. }
            | Self::Process { code, .. }
            | Self::Close { code, .. }
            | Self::BadArchive { code, .. } => Some(*code),
            Self::NotFound { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    /// Returns `true` if the failure was caused by a missing or wrong password.
    #[must_use]
    pub fn is_missing_password(&self) -> bool {
        self.kind() == Some(ErrorKind::MissingPassword)
    }

    /// Returns `true` for catalog lookups of unknown member names.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Re-labels a mid-stream failure as [`RarError::BadArchive`].
    ///
    /// Open, close and lookup errors are returned unchanged.
    #[must_use]
    pub(crate) fn into_bad_archive(self) -> Self {
        match self {
            Self::ArchiveRead { path, code, kind } | Self::Process { path, code, kind, .. } => {
                Self::BadArchive { path, code, kind }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_from_code() {
        assert_eq!(ErrorKind::from_code(11), ErrorKind::NoMemory);
        assert_eq!(ErrorKind::from_code(12), ErrorKind::BadData);
        assert_eq!(ErrorKind::from_code(13), ErrorKind::BadArchive);
        assert_eq!(ErrorKind::from_code(14), ErrorKind::UnknownFormat);
        assert_eq!(ErrorKind::from_code(15), ErrorKind::OpenError);
        assert_eq!(ErrorKind::from_code(16), ErrorKind::CreateError);
        assert_eq!(ErrorKind::from_code(17), ErrorKind::CloseError);
        assert_eq!(ErrorKind::from_code(18), ErrorKind::ReadError);
        assert_eq!(ErrorKind::from_code(19), ErrorKind::WriteError);
        assert_eq!(ErrorKind::from_code(20), ErrorKind::SmallBuffer);
        assert_eq!(ErrorKind::from_code(21), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_code(22), ErrorKind::MissingPassword);
        assert_eq!(ErrorKind::from_code(24), ErrorKind::MissingPassword);
        assert_eq!(ErrorKind::from_code(-7), ErrorKind::Unknown);
    }

    #[test]
    fn test_error_display_names_archive() {
        let err = RarError::ArchiveOpen {
            path: PathBuf::from("broken.rar"),
            code: 13,
            kind: ErrorKind::BadArchive,
        };
        let display = err.to_string();
        assert!(display.contains("broken.rar"));
        assert!(display.contains("not a valid RAR archive"));
        assert!(display.contains("13"));
    }

    #[test]
    fn test_not_found_display() {
        let err = RarError::NotFound {
            name: "missing.txt".into(),
        };
        assert_eq!(
            err.to_string(),
            "there is no item named \"missing.txt\" in the archive"
        );
        assert!(err.is_not_found());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_into_bad_archive_keeps_kind() {
        let err = RarError::Process {
            path: PathBuf::from("secret.rar"),
            member: "a.txt".into(),
            code: 22,
            kind: ErrorKind::MissingPassword,
        };
        let bad = err.into_bad_archive();
        assert!(matches!(bad, RarError::BadArchive { .. }));
        assert!(bad.is_missing_password());
        assert_eq!(bad.code(), Some(22));
    }

    #[test]
    fn test_into_bad_archive_leaves_open_errors() {
        let err = RarError::ArchiveOpen {
            path: PathBuf::from("x.rar"),
            code: 15,
            kind: ErrorKind::OpenError,
        };
        assert!(matches!(
            err.into_bad_archive(),
            RarError::ArchiveOpen { .. }
        ));
    }
}
