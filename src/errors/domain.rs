use crate::errors::api_error::{ApiError, ApiResult};
use std::io;

/// Stable, snake_case identifier of an error variant.
pub trait ErrorCode {
    #[allow(clippy::wrong_self_convention)]
    fn as_code_str(self) -> &'static str;
}

/// Implemented by every module error so handlers can turn it into an [`ApiError`].
pub trait DomainError: std::error::Error {
    fn code_str(&self) -> &'static str;
    fn message(&self) -> &str;

    fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code_str(), self.message())
    }
}

pub fn map_api_result<T, E>(result: Result<T, E>) -> ApiResult<T>
where
    E: DomainError,
{
    result.map_err(|error| error.to_api_error())
}

/// The handful of I/O failure classes module errors distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoErrorHint {
    NotFound,
    PermissionDenied,
    ReadOnlyFilesystem,
    CrossDevice,
    Other,
}

pub fn classify_io_error(error: &io::Error) -> IoErrorHint {
    match error.kind() {
        io::ErrorKind::NotFound => IoErrorHint::NotFound,
        io::ErrorKind::PermissionDenied => IoErrorHint::PermissionDenied,
        // Newer kinds (read-only fs, cross-device) are matched on the raw code so
        // older toolchains classify them the same way.
        _ => error
            .raw_os_error()
            .map(classify_raw_os_error)
            .unwrap_or(IoErrorHint::Other),
    }
}

#[cfg(unix)]
fn classify_raw_os_error(raw: i32) -> IoErrorHint {
    match raw {
        1 | 13 => IoErrorHint::PermissionDenied, // EPERM | EACCES
        2 => IoErrorHint::NotFound,              // ENOENT
        18 => IoErrorHint::CrossDevice,          // EXDEV
        30 => IoErrorHint::ReadOnlyFilesystem,   // EROFS
        _ => IoErrorHint::Other,
    }
}

#[cfg(windows)]
fn classify_raw_os_error(raw: i32) -> IoErrorHint {
    match raw {
        5 => IoErrorHint::PermissionDenied,    // ERROR_ACCESS_DENIED
        2 | 3 => IoErrorHint::NotFound,        // ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND
        17 => IoErrorHint::CrossDevice,        // ERROR_NOT_SAME_DEVICE
        19 => IoErrorHint::ReadOnlyFilesystem, // ERROR_WRITE_PROTECT
        _ => IoErrorHint::Other,
    }
}

#[cfg(not(any(unix, windows)))]
fn classify_raw_os_error(_raw: i32) -> IoErrorHint {
    IoErrorHint::Other
}
