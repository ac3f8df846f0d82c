//! Boundary to the native UnRAR decoder.
//!
//! The [`Decoder`] trait mirrors the five primitives of the UnRAR library
//! (open, read header, process file, set password, close) one to one. It
//! deliberately knows nothing about the read/process pairing or handle
//! lifetimes; those rules live in [`crate::session`]. [`UnrarDecoder`] is the
//! production implementation; [`crate::test_utils::ScriptedDecoder`] stands
//! in for it in tests.

#[allow(unsafe_code)]
mod unrar;

use std::path::Path;

use crate::error::ErrorKind;

pub use unrar::NativeHandle;
pub use unrar::UnrarDecoder;

/// Comment state reported when a comment was read completely.
pub const RAR_COMMENTS_SUCCESS: u32 = 1;

/// Integer result code returned by the native decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultCode(pub i32);

impl ResultCode {
    /// Operation succeeded.
    pub const SUCCESS: Self = Self(0);
    /// End of archive reached; not an error.
    pub const END_ARCHIVE: Self = Self(10);
    /// Not enough memory.
    pub const NO_MEMORY: Self = Self(11);
    /// Archive header or data broken.
    pub const BAD_DATA: Self = Self(12);
    /// Not a RAR archive.
    pub const BAD_ARCHIVE: Self = Self(13);
    /// Unknown header encryption.
    pub const UNKNOWN_FORMAT: Self = Self(14);
    /// Archive or volume open error.
    pub const OPEN_ERROR: Self = Self(15);
    /// File create error.
    pub const CREATE_ERROR: Self = Self(16);
    /// Archive or file close error.
    pub const CLOSE_ERROR: Self = Self(17);
    /// Read error.
    pub const READ_ERROR: Self = Self(18);
    /// Write error.
    pub const WRITE_ERROR: Self = Self(19);
    /// Comment buffer too small.
    pub const SMALL_BUFFER: Self = Self(20);
    /// Unknown error.
    pub const UNKNOWN: Self = Self(21);
    /// Encrypted member without password.
    pub const MISSING_PASSWORD: Self = Self(22);
    /// Wrong password (reported by UnRAR 6 and later).
    pub const BAD_PASSWORD: Self = Self(24);

    /// Classifies the code.
    #[must_use]
    pub const fn status(self) -> Status {
        match self {
            Self::SUCCESS => Status::Success,
            Self::END_ARCHIVE => Status::EndOfArchive,
            Self(code) => Status::Failed(ErrorKind::from_code(code)),
        }
    }

    /// Returns `true` for [`ResultCode::SUCCESS`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }
}

/// Classification of a [`ResultCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The call succeeded.
    Success,
    /// The header stream is exhausted.
    EndOfArchive,
    /// The call failed.
    Failed(ErrorKind),
}

/// Mode an archive handle is opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpenMode {
    /// Headers only.
    List,
    /// Headers plus payload decoding (testing and extraction).
    Extract,
    /// Headers only, following multi-volume continuations and reporting one
    /// header per volume part.
    #[default]
    ListIncludeSplitVolumes,
}

impl OpenMode {
    /// Native open-mode value.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::List => 0,
            Self::Extract => 1,
            Self::ListIncludeSplitVolumes => 2,
        }
    }
}

/// Action applied to the member whose header was read last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move to the next header without decoding.
    Skip,
    /// Decode and verify the checksum, discarding the output.
    Test,
    /// Decode, verify and write to the destination.
    Extract,
    /// Abort an extraction in progress.
    CancelExtract,
}

impl Action {
    /// Native operation value.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Skip => 0,
            Self::Test => 1,
            Self::Extract => 2,
            Self::CancelExtract => -1,
        }
    }
}

/// Parameters of a native open call.
#[derive(Debug, Clone, Copy)]
pub struct OpenRequest<'a> {
    /// Archive path (first volume for multi-volume sets).
    pub path: &'a Path,
    /// Open mode.
    pub mode: OpenMode,
    /// Size of the buffer offered for the archive comment; 0 disables
    /// comment reading.
    pub comment_capacity: usize,
}

/// Everything the native open call reports back.
#[derive(Debug)]
pub struct OpenOutcome<H> {
    /// Handle, if the engine allocated one. A handle can accompany a
    /// failure code and must still be closed.
    pub handle: Option<H>,
    /// Open result code.
    pub result: ResultCode,
    /// Archive comment state.
    pub comment_state: u32,
    /// Raw archive comment bytes, as far as the engine filled them.
    pub comment: Vec<u8>,
}

impl<H> OpenOutcome<H> {
    /// Outcome for a call that never reached the engine.
    #[must_use]
    pub const fn transport_failure(result: ResultCode) -> Self {
        Self {
            handle: None,
            result,
            comment_state: 0,
            comment: Vec::new(),
        }
    }
}

/// Raw member header as reported by the native decoder.
///
/// Sizes are split into 32-bit halves and the timestamp is packed; see
/// [`crate::header::Entry`] for the decoded form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeader {
    /// Member name.
    pub filename: String,
    /// Header flags.
    pub flags: u32,
    /// Low half of the packed size.
    pub pack_size: u32,
    /// High half of the packed size.
    pub pack_size_high: u32,
    /// Low half of the unpacked size.
    pub unp_size: u32,
    /// High half of the unpacked size.
    pub unp_size_high: u32,
    /// Host operating system.
    pub host_os: u32,
    /// CRC32 of the unpacked data.
    pub file_crc: u32,
    /// Packed DOS date/time.
    pub file_time: u32,
    /// Minimum version needed to extract.
    pub unp_ver: u32,
    /// Compression method.
    pub method: u32,
    /// File attributes.
    pub file_attr: u32,
    /// Member comment state.
    pub comment_state: u32,
    /// Member comment bytes.
    pub comment: Vec<u8>,
}

/// The native decoder primitives.
///
/// Implementations perform exactly one native call per method and translate
/// nothing beyond data marshalling; result codes are passed through as-is.
pub trait Decoder {
    /// Opaque open-archive handle.
    type Handle;

    /// Opens an archive.
    fn open(&self, request: &OpenRequest<'_>) -> OpenOutcome<Self::Handle>;

    /// Reads the next member header. `Err` carries every non-success code,
    /// the end-of-archive sentinel included.
    fn read_header(&self, handle: &mut Self::Handle) -> Result<RawHeader, ResultCode>;

    /// Applies `action` to the member whose header was read last.
    fn process_file(
        &self,
        handle: &mut Self::Handle,
        action: Action,
        dest: Option<&Path>,
    ) -> ResultCode;

    /// Sets the password used for all following members of the handle.
    fn set_password(&self, handle: &mut Self::Handle, secret: &[u8]);

    /// Releases the handle.
    fn close(&self, handle: Self::Handle) -> ResultCode;
}

impl<D: Decoder + ?Sized> Decoder for &D {
    type Handle = D::Handle;

    fn open(&self, request: &OpenRequest<'_>) -> OpenOutcome<Self::Handle> {
        (**self).open(request)
    }

    fn read_header(&self, handle: &mut Self::Handle) -> Result<RawHeader, ResultCode> {
        (**self).read_header(handle)
    }

    fn process_file(
        &self,
        handle: &mut Self::Handle,
        action: Action,
        dest: Option<&Path>,
    ) -> ResultCode {
        (**self).process_file(handle, action, dest)
    }

    fn set_password(&self, handle: &mut Self::Handle, secret: &[u8]) {
        (**self).set_password(handle, secret);
    }

    fn close(&self, handle: Self::Handle) -> ResultCode {
        (**self).close(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ResultCode::SUCCESS.status(), Status::Success);
        assert_eq!(ResultCode::END_ARCHIVE.status(), Status::EndOfArchive);
        assert_eq!(
            ResultCode::BAD_DATA.status(),
            Status::Failed(ErrorKind::BadData)
        );
        assert_eq!(
            ResultCode(42).status(),
            Status::Failed(ErrorKind::Unknown)
        );
    }

    #[test]
    fn test_native_values() {
        assert_eq!(OpenMode::List.code(), 0);
        assert_eq!(OpenMode::Extract.code(), 1);
        assert_eq!(OpenMode::ListIncludeSplitVolumes.code(), 2);
        assert_eq!(Action::Skip.code(), 0);
        assert_eq!(Action::Test.code(), 1);
        assert_eq!(Action::Extract.code(), 2);
        assert_eq!(Action::CancelExtract.code(), -1);
    }

    #[test]
    fn test_default_mode_follows_volumes() {
        assert_eq!(OpenMode::default(), OpenMode::ListIncludeSplitVolumes);
    }
}
