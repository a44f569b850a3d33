use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error opening file: {0}")]
    OpenFile(PathBuf),

    #[error("Error writing file: {0}")]
    WriteFile(PathBuf),

    #[error("Error creating parent directory: {0}")]
    ParentDir(PathBuf),

    #[error("Error parsing {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Error serializing report: {0}")]
    ToJSON(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
