use crate::errors::domain::{DomainError, ErrorCode};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathGuardErrorCode {
    PathTraversal,
    InvalidPath,
}

impl ErrorCode for PathGuardErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::PathTraversal => "path_traversal",
            Self::InvalidPath => "invalid_path",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathGuardError {
    code: PathGuardErrorCode,
    message: String,
}

impl PathGuardError {
    pub fn new(code: PathGuardErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn traversal(requested: &Path, root: &Path) -> Self {
        Self::new(
            PathGuardErrorCode::PathTraversal,
            format!(
                "{} is outside of {}",
                requested.display(),
                root.display()
            ),
        )
    }

    pub fn code(&self) -> PathGuardErrorCode {
        self.code
    }
}

impl fmt::Display for PathGuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PathGuardError {}

impl DomainError for PathGuardError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type PathGuardResult<T> = Result<T, PathGuardError>;
