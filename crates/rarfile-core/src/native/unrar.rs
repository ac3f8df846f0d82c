//! [`Decoder`] implementation over the bundled UnRAR library.

use std::ffi::CString;
use std::os::raw::c_char;
use std::os::raw::c_uint;
use std::path::Path;
use std::ptr::NonNull;

use libc::wchar_t;
use unrar_sys as native;

use super::Action;
use super::Decoder;
use super::OpenOutcome;
use super::OpenRequest;
use super::RawHeader;
use super::ResultCode;

/// Open UnRAR archive handle.
///
/// The handle is released by [`Decoder::close`]; dropping it without closing
/// leaks the native archive state.
#[derive(Debug)]
pub struct NativeHandle(NonNull<native::Handle>);

/// Decoder backed by the UnRAR library compiled from source by `unrar_sys`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnrarDecoder;

impl UnrarDecoder {
    /// Creates a new decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Decoder for UnrarDecoder {
    type Handle = NativeHandle;

    fn open(&self, request: &OpenRequest<'_>) -> OpenOutcome<NativeHandle> {
        let Ok(name) = archive_name(request.path) else {
            return OpenOutcome::transport_failure(ResultCode::OPEN_ERROR);
        };

        let mut comment: Vec<c_char> = vec![0; request.comment_capacity];
        let mut data = native::OpenArchiveDataEx::new(name.as_ptr().cast(), request.mode.code());
        if !comment.is_empty() {
            data.comment_buffer = comment.as_mut_ptr();
            data.comment_buffer_size = c_uint::try_from(comment.len()).unwrap_or(c_uint::MAX);
        }

        // SAFETY: `data` points at a valid archive name and comment buffer,
        // both of which outlive the call. The engine writes only within the
        // declared buffer size.
        let raw = unsafe { native::RAROpenArchiveEx(&mut data as *mut _) };
        let handle = NonNull::new(raw as *mut native::Handle).map(NativeHandle);

        let filled = usize::try_from(data.comment_size)
            .unwrap_or(usize::MAX)
            .min(comment.len());
        #[allow(clippy::cast_sign_loss)]
        let comment = comment[..filled].iter().map(|&c| c as u8).collect();

        OpenOutcome {
            handle,
            result: code_from_uint(data.open_result),
            comment_state: data.comment_state,
            comment,
        }
    }

    fn read_header(&self, handle: &mut NativeHandle) -> Result<RawHeader, ResultCode> {
        let mut header = native::HeaderDataEx::default();

        // SAFETY: the handle came from a successful open and has not been
        // closed; `header` is a properly initialized out-parameter.
        let code = unsafe { native::RARReadHeaderEx(handle.0.as_ptr(), &mut header as *mut _) };
        let code = ResultCode(code);
        if !code.is_success() {
            return Err(code);
        }

        Ok(RawHeader {
            filename: wide_to_string(&header.filename_w),
            flags: header.flags,
            pack_size: header.pack_size,
            pack_size_high: header.pack_size_high,
            unp_size: header.unp_size,
            unp_size_high: header.unp_size_high,
            host_os: header.host_os,
            file_crc: header.file_crc,
            file_time: header.file_time,
            unp_ver: header.unp_ver,
            method: header.method,
            file_attr: header.file_attr,
            comment_state: header.comment_state,
            // The DLL does not fill per-file comments.
            comment: Vec::new(),
        })
    }

    fn process_file(
        &self,
        handle: &mut NativeHandle,
        action: Action,
        dest: Option<&Path>,
    ) -> ResultCode {
        let dest = match dest.map(path_to_cstring).transpose() {
            Ok(dest) => dest,
            Err(()) => return ResultCode::CREATE_ERROR,
        };
        let dest_ptr = dest.as_ref().map_or(std::ptr::null(), |d| d.as_ptr());

        // SAFETY: the handle is open and positioned after a header read;
        // `dest_ptr` is null or a NUL-terminated string alive for the call.
        let code = unsafe {
            native::RARProcessFile(
                handle.0.as_ptr(),
                action.code(),
                dest_ptr as *const _,
                std::ptr::null(),
            )
        };
        ResultCode(code)
    }

    fn set_password(&self, handle: &mut NativeHandle, secret: &[u8]) {
        let Ok(secret) = CString::new(secret) else {
            tracing::warn!("password contains a NUL byte and was not applied");
            return;
        };

        // SAFETY: the handle is open; the engine copies the password before
        // returning.
        unsafe { native::RARSetPassword(handle.0.as_ptr(), secret.as_ptr() as *const _) };
    }

    fn close(&self, handle: NativeHandle) -> ResultCode {
        // SAFETY: the handle is open and consumed here, so it cannot be
        // closed twice.
        let code = unsafe { native::RARCloseArchive(handle.0.as_ptr() as *const _) };
        ResultCode(code)
    }
}

fn code_from_uint(code: c_uint) -> ResultCode {
    i32::try_from(code).map_or(ResultCode::UNKNOWN, ResultCode)
}

/// Archive name in the encoding `OpenArchiveDataEx::new` expects: the
/// narrow name on Linux and NetBSD, the wide name everywhere else.
#[cfg(any(target_os = "linux", target_os = "netbsd"))]
fn archive_name(path: &Path) -> Result<CString, ()> {
    path_to_cstring(path)
}

#[cfg(not(any(target_os = "linux", target_os = "netbsd")))]
fn archive_name(path: &Path) -> Result<widestring::WideCString, ()> {
    widestring::WideCString::from_os_str(path.as_os_str()).map_err(|_| ())
}

#[cfg(unix)]
fn path_to_cstring(path: &Path) -> Result<CString, ()> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes()).map_err(|_| ())
}

#[cfg(not(unix))]
fn path_to_cstring(path: &Path) -> Result<CString, ()> {
    CString::new(path.to_string_lossy().into_owned()).map_err(|_| ())
}

/// Decodes a NUL-terminated wide string buffer.
#[cfg(not(windows))]
fn wide_to_string(buf: &[wchar_t]) -> String {
    #[allow(clippy::cast_sign_loss)]
    buf.iter()
        .take_while(|&&c| c != 0)
        .map(|&c| char::from_u32(c as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decodes a NUL-terminated wide string buffer.
#[cfg(windows)]
fn wide_to_string(buf: &[wchar_t]) -> String {
    char::decode_utf16(buf.iter().take_while(|&&c| c != 0).copied())
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
