use crate::errors::domain::{classify_io_error, DomainError, ErrorCode, IoErrorHint};
use crate::path_guard::{PathGuardError, PathGuardErrorCode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailErrorCode {
    PathTraversal,
    NotFound,
    PermissionDenied,
    UnsupportedMediaType,
    ExternalTool,
    DecodeFailed,
    CacheFailed,
    Filesystem,
}

impl ErrorCode for ThumbnailErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::PathTraversal => "path_traversal",
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::ExternalTool => "external_tool",
            Self::DecodeFailed => "decode_failed",
            Self::CacheFailed => "cache_failed",
            Self::Filesystem => "filesystem",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailError {
    code: ThumbnailErrorCode,
    message: String,
}

impl ThumbnailError {
    pub fn new(code: ThumbnailErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_io_error(
        fallback: ThumbnailErrorCode,
        context: &str,
        error: std::io::Error,
    ) -> Self {
        let code = match classify_io_error(&error) {
            IoErrorHint::NotFound => ThumbnailErrorCode::NotFound,
            IoErrorHint::PermissionDenied => ThumbnailErrorCode::PermissionDenied,
            _ => fallback,
        };
        Self::new(code, format!("{context}: {error}"))
    }

    pub fn from_guard(error: PathGuardError) -> Self {
        let code = match error.code() {
            PathGuardErrorCode::PathTraversal => ThumbnailErrorCode::PathTraversal,
            PathGuardErrorCode::InvalidPath => ThumbnailErrorCode::NotFound,
        };
        Self::new(code, error.to_string())
    }

    pub fn external_tool(message: impl Into<String>) -> Self {
        Self::new(ThumbnailErrorCode::ExternalTool, message)
    }

    #[cfg(test)]
    pub fn code(&self) -> ThumbnailErrorCode {
        self.code
    }
}

impl fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ThumbnailError {}

impl DomainError for ThumbnailError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type ThumbnailResult<T> = Result<T, ThumbnailError>;
