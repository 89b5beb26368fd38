use crate::errors::domain::{classify_io_error, DomainError, ErrorCode, IoErrorHint};
use crate::path_guard::{PathGuardError, PathGuardErrorCode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationErrorCode {
    PathTraversal,
    NotFound,
    PermissionDenied,
    ReadOnlyFilesystem,
    DeleteFailed,
    MoveFailed,
}

impl ErrorCode for MutationErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::PathTraversal => "path_traversal",
            // Not `not_found`: a vanished batch item is a client error with detail.
            Self::NotFound => "item_not_found",
            Self::PermissionDenied => "permission_denied",
            Self::ReadOnlyFilesystem => "read_only_filesystem",
            Self::DeleteFailed => "delete_failed",
            Self::MoveFailed => "move_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MutationError {
    code: MutationErrorCode,
    message: String,
}

impl MutationError {
    pub fn new(code: MutationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_io_error(fallback: MutationErrorCode, context: &str, error: std::io::Error) -> Self {
        let code = match classify_io_error(&error) {
            IoErrorHint::NotFound => MutationErrorCode::NotFound,
            IoErrorHint::PermissionDenied => MutationErrorCode::PermissionDenied,
            IoErrorHint::ReadOnlyFilesystem => MutationErrorCode::ReadOnlyFilesystem,
            _ => fallback,
        };
        Self::new(code, format!("{context}: {error}"))
    }

    pub fn from_guard(error: PathGuardError) -> Self {
        let code = match error.code() {
            PathGuardErrorCode::PathTraversal | PathGuardErrorCode::InvalidPath => {
                MutationErrorCode::PathTraversal
            }
        };
        Self::new(code, error.to_string())
    }

    #[cfg(test)]
    pub fn code(&self) -> MutationErrorCode {
        self.code
    }
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for MutationError {}

impl DomainError for MutationError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type MutationResult<T> = Result<T, MutationError>;
