use std::fmt;

use swaplock::SwapError;

#[derive(Debug)]
pub enum CliError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    SwapError(SwapError),
    InvalidInput(String),
    FileExists(String),
    FileNotFound(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::IoError(e) => write!(f, "IO error: {e}"),
            CliError::JsonError(e) => write!(f, "JSON error: {e}"),
            CliError::SwapError(e) => write!(f, "{e}"),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            CliError::FileExists(path) => write!(f, "File already exists: {path}"),
            CliError::FileNotFound(path) => write!(f, "File not found: {path}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::IoError(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        CliError::JsonError(error)
    }
}

impl From<SwapError> for CliError {
    fn from(error: SwapError) -> Self {
        CliError::SwapError(error)
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
