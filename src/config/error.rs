use crate::errors::domain::{DomainError, ErrorCode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    HomeNotFound,
    WorkingDirUnavailable,
    RootNotDirectory,
}

impl ErrorCode for ConfigErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::HomeNotFound => "home_not_found",
            Self::WorkingDirUnavailable => "working_dir_unavailable",
            Self::RootNotDirectory => "root_not_directory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    code: ConfigErrorCode,
    message: String,
}

impl ConfigError {
    pub fn new(code: ConfigErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub fn code(&self) -> ConfigErrorCode {
        self.code
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl DomainError for ConfigError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
