//! Configuration for opening RAR archives.

use std::fmt;

use crate::native::OpenMode;

/// Default size of the archive comment buffer (64 KiB, the largest comment
/// RAR stores).
pub const DEFAULT_COMMENT_CAPACITY: usize = 64 * 1024;

/// Archive password.
///
/// `Debug` output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Vec<u8>);

impl Password {
    /// Creates a password from raw bytes.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl From<&str> for Password {
    fn from(secret: &str) -> Self {
        Self::new(secret.as_bytes())
    }
}

impl From<String> for Password {
    fn from(secret: String) -> Self {
        Self::new(secret.into_bytes())
    }
}

/// Settings applied to every pass over an archive.
///
/// # Examples
///
/// ```
/// use rarfile_core::ArchiveConfig;
/// use rarfile_core::OpenMode;
///
/// let config = ArchiveConfig::default()
///     .with_password("secret")
///     .with_listing_mode(OpenMode::List);
/// assert!(config.password.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Mode used for the catalog listing pass.
    pub listing_mode: OpenMode,

    /// Session default password. A password passed to an individual call
    /// takes precedence.
    pub password: Option<Password>,

    /// Size of the buffer offered for the archive comment; 0 skips reading
    /// the comment.
    pub comment_capacity: usize,
}

impl Default for ArchiveConfig {
    /// Default values:
    /// - `listing_mode`: `ListIncludeSplitVolumes`
    /// - `password`: none
    /// - `comment_capacity`: 64 KiB
    fn default() -> Self {
        Self {
            listing_mode: OpenMode::ListIncludeSplitVolumes,
            password: None,
            comment_capacity: DEFAULT_COMMENT_CAPACITY,
        }
    }
}

impl ArchiveConfig {
    /// Sets the session default password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the listing mode.
    #[must_use]
    pub const fn with_listing_mode(mut self, mode: OpenMode) -> Self {
        self.listing_mode = mode;
        self
    }

    /// Sets the comment buffer size.
    #[must_use]
    pub const fn with_comment_capacity(mut self, capacity: usize) -> Self {
        self.comment_capacity = capacity;
        self
    }

    /// Picks the password for one call: the call-site argument wins over
    /// the session default.
    #[must_use]
    pub fn effective_password<'a>(
        &'a self,
        call_site: Option<&'a Password>,
    ) -> Option<&'a Password> {
        call_site.or(self.password.as_ref())
    }
}
