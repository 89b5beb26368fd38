use crate::errors::domain::{classify_io_error, DomainError, ErrorCode, IoErrorHint};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorCode {
    WalkFailed,
    NotFound,
    PermissionDenied,
}

impl ErrorCode for ScanErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::WalkFailed => "walk_failed",
            Self::NotFound => "walk_not_found",
            Self::PermissionDenied => "walk_permission_denied",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanError {
    code: ScanErrorCode,
    message: String,
}

impl ScanError {
    pub fn new(code: ScanErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_walk_error(error: walkdir::Error) -> Self {
        let context = match error.path() {
            Some(path) => format!("Failed to walk {}", path.display()),
            None => "Failed to walk directory".to_string(),
        };
        let code = match error.io_error().map(classify_io_error) {
            Some(IoErrorHint::NotFound) => ScanErrorCode::NotFound,
            Some(IoErrorHint::PermissionDenied) => ScanErrorCode::PermissionDenied,
            _ => ScanErrorCode::WalkFailed,
        };
        Self::new(code, format!("{context}: {error}"))
    }

    #[cfg(test)]
    pub fn code(&self) -> ScanErrorCode {
        self.code
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScanError {}

impl DomainError for ScanError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
