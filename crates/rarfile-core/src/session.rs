//! One open pass over an archive.
//!
//! A [`Session`] owns exactly one native handle from [`Session::open`] until
//! it is closed, either explicitly through [`Session::close`] or implicitly
//! when it is dropped. The header-read / process-file pairing the native
//! decoder requires is only reachable through [`Session::advance`], so a
//! caller cannot read two headers in a row.
//!
//! ```text
//! Opened --advance--> Opened
//!   |                   |
//!   | end of archive    | read/process failure
//!   v                   v
//! EndOfArchive        Failed
//!   \                  /
//!    +-- close/drop --+
//! ```
//!
//! Closing consumes the session, so there is no observable closed state.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::RarError;
use crate::Result;
use crate::config::Password;
use crate::error::ErrorKind;
use crate::header::Entry;
use crate::header::decode_comment;
use crate::native::Action;
use crate::native::Decoder;
use crate::native::OpenMode;
use crate::native::OpenRequest;
use crate::native::RAR_COMMENTS_SUCCESS;
use crate::native::ResultCode;
use crate::native::Status;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handle open, next call reads a header.
    Opened,
    /// Header stream exhausted.
    EndOfArchive,
    /// A read or process call failed; no further native calls are issued.
    Failed,
}

/// One member visited by [`Session::advance`].
#[derive(Debug, Clone)]
pub struct Step {
    /// Decoded member header.
    pub entry: Entry,
    /// Action that was applied to it.
    pub action: Action,
}

/// Guard around one open native handle.
pub struct Session<'d, D: Decoder + ?Sized> {
    decoder: &'d D,
    handle: Option<D::Handle>,
    archive: PathBuf,
    state: SessionState,
    comment: Option<String>,
}

impl<'d, D: Decoder + ?Sized> Session<'d, D> {
    /// Opens `path` in `mode`.
    ///
    /// When `password` is given it is applied before the first header read
    /// and covers every member of this handle. If the engine hands back a
    /// handle together with a failure code, that handle is closed before the
    /// error is returned.
    pub fn open(
        decoder: &'d D,
        path: &Path,
        mode: OpenMode,
        password: Option<&Password>,
        comment_capacity: usize,
    ) -> Result<Self> {
        debug!(archive = %path.display(), ?mode, "opening archive");
        let outcome = decoder.open(&OpenRequest {
            path,
            mode,
            comment_capacity,
        });

        let mut handle = match (outcome.handle, outcome.result.status()) {
            (Some(handle), Status::Success) => handle,
            (handle, status) => {
                if let Some(handle) = handle {
                    let code = decoder.close(handle);
                    if !code.is_success() {
                        warn!(
                            archive = %path.display(),
                            code = code.0,
                            "close after failed open failed"
                        );
                    }
                }
                // A missing handle with a success code means the call never
                // produced an archive.
                let code = match status {
                    Status::Failed(_) => outcome.result,
                    _ => ResultCode::UNKNOWN,
                };
                return Err(RarError::ArchiveOpen {
                    path: path.to_path_buf(),
                    code: code.0,
                    kind: ErrorKind::from_code(code.0),
                });
            }
        };

        if let Some(password) = password {
            decoder.set_password(&mut handle, password.as_bytes());
        }

        let comment = (outcome.comment_state == RAR_COMMENTS_SUCCESS)
            .then(|| decode_comment(&outcome.comment));

        Ok(Self {
            decoder,
            handle: Some(handle),
            archive: path.to_path_buf(),
            state: SessionState::Opened,
            comment,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Archive comment, present only when it was read completely.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Takes the archive comment out of the session.
    pub fn take_comment(&mut self) -> Option<String> {
        self.comment.take()
    }

    /// Reads the next header, lets `choose` pick the action for it and
    /// applies that action.
    ///
    /// `dest` is only passed to the native layer for [`Action::Extract`];
    /// `None` extracts into the current working directory. Returns
    /// `Ok(None)` at the end of the archive, and for every call after the
    /// session ended or failed.
    pub fn advance<F>(&mut self, choose: F, dest: Option<&Path>) -> Result<Option<Step>>
    where
        F: FnOnce(&Entry) -> Action,
    {
        if self.state != SessionState::Opened {
            return Ok(None);
        }

        let Some(entry) = self.read_next_header()? else {
            return Ok(None);
        };

        let action = choose(&entry);
        let dest = if action == Action::Extract { dest } else { None };
        self.process_current(&entry, action, dest)?;

        Ok(Some(Step { entry, action }))
    }

    /// Drives the session to the end of the archive and closes it.
    ///
    /// Every visited member is handed to `visit` after its action succeeded.
    /// The handle is released on every path out of this function.
    pub fn run<C, V>(mut self, mut choose: C, dest: Option<&Path>, mut visit: V) -> Result<()>
    where
        C: FnMut(&Entry) -> Action,
        V: FnMut(Step),
    {
        while let Some(step) = self.advance(&mut choose, dest)? {
            visit(step);
        }
        self.close()
    }

    /// Closes the handle and reports the native close result.
    ///
    /// The native close runs at most once per session, whether through this
    /// method or through `Drop`.
    pub fn close(mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let code = self.decoder.close(handle);
        debug!(archive = %self.archive.display(), code = code.0, "archive closed");
        if code.is_success() {
            Ok(())
        } else {
            Err(RarError::Close {
                path: self.archive.clone(),
                code: code.0,
                kind: ErrorKind::from_code(code.0),
            })
        }
    }

    fn read_next_header(&mut self) -> Result<Option<Entry>> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(None);
        };

        match self.decoder.read_header(handle) {
            Ok(raw) => {
                let entry = Entry::from_raw(&raw);
                trace!(archive = %self.archive.display(), member = %entry.filename, "header read");
                Ok(Some(entry))
            }
            Err(code) => match code.status() {
                Status::EndOfArchive | Status::Success => {
                    self.state = SessionState::EndOfArchive;
                    Ok(None)
                }
                Status::Failed(kind) => {
                    self.state = SessionState::Failed;
                    Err(RarError::ArchiveRead {
                        path: self.archive.clone(),
                        code: code.0,
                        kind,
                    })
                }
            },
        }
    }

    fn process_current(
        &mut self,
        entry: &Entry,
        action: Action,
        dest: Option<&Path>,
    ) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };

        trace!(member = %entry.filename, ?action, "processing member");
        let code = self.decoder.process_file(handle, action, dest);
        match code.status() {
            Status::Success => Ok(()),
            Status::EndOfArchive | Status::Failed(_) => {
                self.state = SessionState::Failed;
                Err(RarError::Process {
                    path: self.archive.clone(),
                    member: entry.filename.clone(),
                    code: code.0,
                    kind: ErrorKind::from_code(code.0),
                })
            }
        }
    }
}

impl<D: Decoder + ?Sized> Drop for Session<'_, D> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let code = self.decoder.close(handle);
            if !code.is_success() {
                warn!(archive = %self.archive.display(), code = code.0, "failed to close archive");
            }
        }
    }
}

impl<D: Decoder + ?Sized> std::fmt::Debug for Session<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("archive", &self.archive)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::Call;
    use crate::test_utils::ScriptedDecoder;

    fn open<'d>(decoder: &'d ScriptedDecoder) -> Session<'d, ScriptedDecoder> {
        Session::open(decoder, Path::new("test.rar"), OpenMode::List, None, 0).unwrap()
    }

    #[test]
    fn test_advance_pairs_read_and_process() {
        let decoder = ScriptedDecoder::new()
            .add_member("a.txt", b"aaa")
            .add_member("b.txt", b"bbb");
        let mut session = open(&decoder);

        let step = session.advance(|_| Action::Skip, None).unwrap().unwrap();
        assert_eq!(step.entry.filename, "a.txt");
        assert_eq!(step.action, Action::Skip);

        let step = session.advance(|_| Action::Skip, None).unwrap().unwrap();
        assert_eq!(step.entry.filename, "b.txt");

        assert!(session.advance(|_| Action::Skip, None).unwrap().is_none());
        assert_eq!(session.state(), SessionState::EndOfArchive);
        session.close().unwrap();

        assert_eq!(
            decoder.calls(),
            vec![
                Call::Open(OpenMode::List),
                Call::ReadHeader,
                Call::Process("a.txt".into(), Action::Skip),
                Call::ReadHeader,
                Call::Process("b.txt".into(), Action::Skip),
                Call::ReadHeader,
                Call::Close,
            ]
        );
    }

    #[test]
    fn test_advance_after_end_is_silent() {
        let decoder = ScriptedDecoder::new();
        let mut session = open(&decoder);
        assert!(session.advance(|_| Action::Skip, None).unwrap().is_none());
        assert!(session.advance(|_| Action::Skip, None).unwrap().is_none());
        drop(session);

        let reads = decoder
            .calls()
            .iter()
            .filter(|c| **c == Call::ReadHeader)
            .count();
        assert_eq!(reads, 1);
    }

    #[test]
    fn test_drop_closes_once() {
        let decoder = ScriptedDecoder::new().add_member("a.txt", b"a");
        {
            let mut session = open(&decoder);
            session.advance(|_| Action::Skip, None).unwrap();
        }
        assert_eq!(decoder.close_count(), 1);
        assert_eq!(decoder.open_handles(), 0);
    }

    #[test]
    fn test_explicit_close_is_not_repeated_by_drop() {
        let decoder = ScriptedDecoder::new();
        let session = open(&decoder);
        session.close().unwrap();
        assert_eq!(decoder.close_count(), 1);
    }

    #[test]
    fn test_open_failure_maps_code() {
        let decoder = ScriptedDecoder::new().with_open_result(ResultCode::BAD_ARCHIVE);
        let err = Session::open(&decoder, Path::new("junk.bin"), OpenMode::List, None, 0)
            .unwrap_err();
        match err {
            RarError::ArchiveOpen { path, code, kind } => {
                assert_eq!(path, PathBuf::from("junk.bin"));
                assert_eq!(code, 13);
                assert_eq!(kind, ErrorKind::BadArchive);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(decoder.close_count(), 0);
    }

    #[test]
    fn test_open_failure_with_handle_still_closes() {
        let decoder = ScriptedDecoder::new()
            .with_open_result(ResultCode::MISSING_PASSWORD)
            .with_handle_on_failed_open();
        let err = Session::open(&decoder, Path::new("locked.rar"), OpenMode::List, None, 0)
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingPassword));
        assert_eq!(decoder.close_count(), 1);
        assert_eq!(decoder.open_handles(), 0);
    }

    #[test]
    fn test_missing_handle_is_transport_failure() {
        let decoder = ScriptedDecoder::new().without_handle();
        let err = Session::open(&decoder, Path::new("a.rar"), OpenMode::List, None, 0)
            .unwrap_err();
        assert!(matches!(err, RarError::ArchiveOpen { code: 21, .. }));
    }

    #[test]
    fn test_read_failure_stops_session() {
        let decoder = ScriptedDecoder::new()
            .add_member("a.txt", b"a")
            .with_read_failure(1, ResultCode::BAD_DATA);
        let mut session = open(&decoder);

        session.advance(|_| Action::Skip, None).unwrap();
        let err = session.advance(|_| Action::Skip, None).unwrap_err();
        assert!(matches!(err, RarError::ArchiveRead { code: 12, .. }));
        assert_eq!(session.state(), SessionState::Failed);

        // No further native calls once failed.
        let before = decoder.calls().len();
        assert!(session.advance(|_| Action::Skip, None).unwrap().is_none());
        assert_eq!(decoder.calls().len(), before);
    }

    #[test]
    fn test_process_failure_names_member() {
        let decoder = ScriptedDecoder::new().add_corrupt_member("bad.txt", b"x");
        let mut session = open(&decoder);
        let err = session.advance(|_| Action::Test, None).unwrap_err();
        match err {
            RarError::Process { member, kind, .. } => {
                assert_eq!(member, "bad.txt");
                assert_eq!(kind, ErrorKind::BadData);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_run_closes_on_error() {
        let decoder = ScriptedDecoder::new()
            .add_member("a.txt", b"a")
            .with_read_failure(1, ResultCode::READ_ERROR);
        let session = open(&decoder);
        let result = session.run(|_| Action::Skip, None, |_| {});
        assert!(result.is_err());
        assert_eq!(decoder.close_count(), 1);
    }

    #[test]
    fn test_close_failure_is_reported() {
        let decoder = ScriptedDecoder::new().with_close_result(ResultCode::CLOSE_ERROR);
        let session = open(&decoder);
        let err = session.close().unwrap_err();
        assert!(matches!(err, RarError::Close { code: 17, .. }));
        assert_eq!(decoder.close_count(), 1);
    }

    #[test]
    fn test_password_set_before_first_read() {
        let decoder = ScriptedDecoder::new().add_member("a.txt", b"a");
        let password = Password::from("pw");
        let mut session = Session::open(
            &decoder,
            Path::new("a.rar"),
            OpenMode::Extract,
            Some(&password),
            0,
        )
        .unwrap();
        session.advance(|_| Action::Skip, None).unwrap();
        drop(session);

        let calls = decoder.calls();
        assert_eq!(calls[0], Call::Open(OpenMode::Extract));
        assert_eq!(calls[1], Call::SetPassword(b"pw".to_vec()));
        assert_eq!(calls[2], Call::ReadHeader);
    }

    #[test]
    fn test_archive_comment_captured() {
        let decoder = ScriptedDecoder::new().with_comment("release notes");
        let session = Session::open(
            &decoder,
            Path::new("a.rar"),
            OpenMode::List,
            None,
            1024,
        )
        .unwrap();
        assert_eq!(session.comment(), Some("release notes"));
    }

    #[test]
    fn test_dest_only_passed_for_extract() {
        let temp = tempfile::TempDir::new().unwrap();
        let decoder = ScriptedDecoder::new().add_member("a.txt", b"a");
        let mut session = Session::open(
            &decoder,
            Path::new("a.rar"),
            OpenMode::Extract,
            None,
            0,
        )
        .unwrap();
        session.advance(|_| Action::Test, Some(temp.path())).unwrap();
        drop(session);
        assert!(!temp.path().join("a.txt").exists());
    }
}
