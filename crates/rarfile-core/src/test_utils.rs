//! Test utilities for exercising sessions without the native library.
//!
//! [`ScriptedDecoder`] implements [`Decoder`] over an in-memory list of
//! members and records every primitive call, so tests can assert both the
//! outcome of an operation and the exact native call sequence behind it.
//!
//! # Panics
//!
//! Functions in this module may panic on I/O errors since they are designed
//! for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::cell::Cell;
use std::cell::RefCell;
use std::fs;
use std::path::Path;

use crate::header::EntryFlags;
use crate::native::Action;
use crate::native::Decoder;
use crate::native::OpenMode;
use crate::native::OpenOutcome;
use crate::native::OpenRequest;
use crate::native::RAR_COMMENTS_SUCCESS;
use crate::native::RawHeader;
use crate::native::ResultCode;

/// Packed timestamp given to scripted members (2025-01-14 13:26:30).
pub const SCRIPTED_TIMESTAMP: u32 = 0x5A2E_6B4F;

/// One primitive call observed by a [`ScriptedDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Archive opened in the given mode.
    Open(OpenMode),
    /// Password applied to the handle.
    SetPassword(Vec<u8>),
    /// Header read attempted.
    ReadHeader,
    /// Action applied to the named member.
    Process(String, Action),
    /// Handle closed.
    Close,
}

#[derive(Debug, Clone)]
struct ScriptedMember {
    header: RawHeader,
    data: Vec<u8>,
    corrupt: bool,
}

/// Handle returned by [`ScriptedDecoder::open`].
#[derive(Debug)]
pub struct ScriptedHandle {
    cursor: usize,
    current: Option<usize>,
    password: Option<Vec<u8>>,
}

/// In-memory [`Decoder`] with a configurable member list and failure script.
///
/// # Examples
///
/// ```
/// use rarfile_core::ArchiveConfig;
/// use rarfile_core::RarFile;
/// use rarfile_core::test_utils::ScriptedDecoder;
///
/// let decoder = ScriptedDecoder::new()
///     .add_member("a.txt", b"hello")
///     .add_member("b/c.txt", b"world");
/// let archive = RarFile::with_decoder("scripted.rar", decoder, ArchiveConfig::default()).unwrap();
/// assert_eq!(archive.namelist(), vec!["a.txt", "b/c.txt"]);
/// ```
#[derive(Debug)]
pub struct ScriptedDecoder {
    members: Vec<ScriptedMember>,
    password: Option<Vec<u8>>,
    encrypted_headers: bool,
    open_result: ResultCode,
    handle_on_failed_open: bool,
    no_handle: bool,
    close_result: ResultCode,
    read_failure: Option<(usize, ResultCode)>,
    comment: Option<String>,
    calls: RefCell<Vec<Call>>,
    open_count: Cell<usize>,
    close_count: Cell<usize>,
    live_handles: Cell<usize>,
}

impl Default for ScriptedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDecoder {
    /// Creates a decoder for an empty, well-formed archive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            password: None,
            encrypted_headers: false,
            open_result: ResultCode::SUCCESS,
            handle_on_failed_open: false,
            no_handle: false,
            close_result: ResultCode::SUCCESS,
            read_failure: None,
            comment: None,
            calls: RefCell::new(Vec::new()),
            open_count: Cell::new(0),
            close_count: Cell::new(0),
            live_handles: Cell::new(0),
        }
    }

    /// Appends a stored file member.
    #[must_use]
    pub fn add_member(self, name: &str, data: &[u8]) -> Self {
        self.push(file_header(name, data.len(), 0), data, false)
    }

    /// Appends a member whose payload fails the checksum.
    #[must_use]
    pub fn add_corrupt_member(self, name: &str, data: &[u8]) -> Self {
        self.push(file_header(name, data.len(), 0), data, true)
    }

    /// Appends a member that decodes only with the archive password.
    #[must_use]
    pub fn add_encrypted_member(self, name: &str, data: &[u8]) -> Self {
        self.push(file_header(name, data.len(), EntryFlags::ENCRYPTED), data, false)
    }

    /// Appends a directory member.
    #[must_use]
    pub fn add_directory(self, name: &str) -> Self {
        self.push(file_header(name, 0, EntryFlags::DIRECTORY), &[], false)
    }

    /// Appends a member with a caller-built header.
    #[must_use]
    pub fn add_raw(self, header: RawHeader, data: &[u8]) -> Self {
        self.push(header, data, false)
    }

    /// Sets the password that encrypted members (and encrypted headers)
    /// require.
    #[must_use]
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.as_bytes().to_vec());
        self
    }

    /// Makes every header read fail with a missing-password code until the
    /// correct password is set.
    #[must_use]
    pub const fn with_encrypted_headers(mut self) -> Self {
        self.encrypted_headers = true;
        self
    }

    /// Sets the result code of every open call.
    #[must_use]
    pub const fn with_open_result(mut self, code: ResultCode) -> Self {
        self.open_result = code;
        self
    }

    /// Hands out a handle even when open fails.
    #[must_use]
    pub const fn with_handle_on_failed_open(mut self) -> Self {
        self.handle_on_failed_open = true;
        self
    }

    /// Never hands out a handle.
    #[must_use]
    pub const fn without_handle(mut self) -> Self {
        self.no_handle = true;
        self
    }

    /// Sets the result code of every close call.
    #[must_use]
    pub const fn with_close_result(mut self, code: ResultCode) -> Self {
        self.close_result = code;
        self
    }

    /// Fails the header read at position `index` (0-based) with `code`.
    #[must_use]
    pub const fn with_read_failure(mut self, index: usize, code: ResultCode) -> Self {
        self.read_failure = Some((index, code));
        self
    }

    /// Sets the archive comment.
    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// Every call observed so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Number of calls observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of successful or failed open calls.
    pub fn open_count(&self) -> usize {
        self.open_count.get()
    }

    /// Number of close calls.
    pub fn close_count(&self) -> usize {
        self.close_count.get()
    }

    /// Handles handed out and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.live_handles.get()
    }

    /// Actions applied to members, in call order.
    pub fn processed(&self) -> Vec<(String, Action)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Process(name, action) => Some((name.clone(), *action)),
                _ => None,
            })
            .collect()
    }

    fn push(mut self, header: RawHeader, data: &[u8], corrupt: bool) -> Self {
        self.members.push(ScriptedMember {
            header,
            data: data.to_vec(),
            corrupt,
        });
        self
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn password_matches(&self, handle: &ScriptedHandle) -> bool {
        match &self.password {
            Some(expected) => handle.password.as_ref() == Some(expected),
            None => true,
        }
    }
}

impl Decoder for ScriptedDecoder {
    type Handle = ScriptedHandle;

    fn open(&self, request: &OpenRequest<'_>) -> OpenOutcome<ScriptedHandle> {
        self.record(Call::Open(request.mode));
        self.open_count.set(self.open_count.get() + 1);

        let handle_out =
            !self.no_handle && (self.open_result.is_success() || self.handle_on_failed_open);
        if handle_out {
            self.live_handles.set(self.live_handles.get() + 1);
        }
        let handle = handle_out.then_some(ScriptedHandle {
            cursor: 0,
            current: None,
            password: None,
        });

        let (comment_state, comment) = match &self.comment {
            Some(text) if request.comment_capacity > 0 => {
                let bytes = text.as_bytes();
                if bytes.len() < request.comment_capacity {
                    (RAR_COMMENTS_SUCCESS, bytes.to_vec())
                } else {
                    #[allow(clippy::cast_sign_loss)]
                    let state = ResultCode::SMALL_BUFFER.0 as u32;
                    (state, bytes[..request.comment_capacity].to_vec())
                }
            }
            _ => (0, Vec::new()),
        };

        OpenOutcome {
            handle,
            result: self.open_result,
            comment_state,
            comment,
        }
    }

    fn read_header(&self, handle: &mut ScriptedHandle) -> Result<RawHeader, ResultCode> {
        self.record(Call::ReadHeader);
        handle.current = None;

        if let Some((index, code)) = self.read_failure {
            if index == handle.cursor {
                return Err(code);
            }
        }
        if self.encrypted_headers && !self.password_matches(handle) {
            return Err(ResultCode::MISSING_PASSWORD);
        }

        let Some(member) = self.members.get(handle.cursor) else {
            return Err(ResultCode::END_ARCHIVE);
        };
        handle.current = Some(handle.cursor);
        handle.cursor += 1;
        Ok(member.header.clone())
    }

    fn process_file(
        &self,
        handle: &mut ScriptedHandle,
        action: Action,
        dest: Option<&Path>,
    ) -> ResultCode {
        let Some(index) = handle.current.take() else {
            self.record(Call::Process(String::new(), action));
            return ResultCode::BAD_DATA;
        };
        let member = &self.members[index];
        self.record(Call::Process(member.header.filename.clone(), action));

        if matches!(action, Action::Skip | Action::CancelExtract) {
            return ResultCode::SUCCESS;
        }

        let encrypted = EntryFlags::from_bits(member.header.flags).contains(EntryFlags::ENCRYPTED);
        if encrypted && !self.password_matches(handle) {
            return ResultCode::MISSING_PASSWORD;
        }
        if member.corrupt {
            return ResultCode::BAD_DATA;
        }

        if action == Action::Extract {
            let root = dest.unwrap_or_else(|| Path::new("."));
            let target = root.join(&member.header.filename);
            let is_dir = EntryFlags::from_bits(member.header.flags).contains(EntryFlags::DIRECTORY);
            let written = if is_dir {
                fs::create_dir_all(&target)
            } else {
                target
                    .parent()
                    .map_or(Ok(()), fs::create_dir_all)
                    .and_then(|()| fs::write(&target, &member.data))
            };
            if written.is_err() {
                return ResultCode::CREATE_ERROR;
            }
        }

        ResultCode::SUCCESS
    }

    fn set_password(&self, handle: &mut ScriptedHandle, secret: &[u8]) {
        self.record(Call::SetPassword(secret.to_vec()));
        handle.password = Some(secret.to_vec());
    }

    fn close(&self, _handle: ScriptedHandle) -> ResultCode {
        self.record(Call::Close);
        self.close_count.set(self.close_count.get() + 1);
        self.live_handles.set(self.live_handles.get().saturating_sub(1));
        self.close_result
    }
}

fn file_header(name: &str, size: usize, flags: u32) -> RawHeader {
    let size = u32::try_from(size).unwrap();
    RawHeader {
        filename: name.to_string(),
        flags,
        pack_size: size,
        unp_size: size,
        host_os: 3,
        file_time: SCRIPTED_TIMESTAMP,
        unp_ver: 29,
        method: 0x30,
        file_attr: 0o100_644,
        ..RawHeader::default()
    }
}
