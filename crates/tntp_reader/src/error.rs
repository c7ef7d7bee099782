use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TntpError {
    #[error("Failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Duplicate key {key} in {}", .path.display())]
    DuplicateKey { path: PathBuf, key: String },
    #[error("Malformed file {} (line {line}): {reason}", .path.display())]
    MalformedFile {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("No origin block found in demand file {}", .path.display())]
    DemandParse { path: PathBuf },
    #[error("Column {column} exists in both the edge and the flow table")]
    ColumnOverlap { column: String },
    #[error("Flow key level {level} has values missing from the edge table (e.g. {sample})")]
    FlowKeyMismatch { level: String, sample: String },
}

impl TntpError {
    pub(crate) fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        TntpError::MalformedFile {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn duplicate_key(path: &Path, key: impl ToString) -> Self {
        TntpError::DuplicateKey {
            path: path.to_path_buf(),
            key: key.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TntpError>;
