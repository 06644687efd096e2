// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for picasa2shotwell

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Migration error types
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("INI error in {path}: {reason}")]
    Ini { path: PathBuf, reason: String },

    #[error("Cannot map legacy path: {0}")]
    PathMapping(String),

    #[error("Source read error for {path}: {reason}")]
    SourceRead { path: PathBuf, reason: String },

    #[error("Sink write error for {path}: {reason}")]
    SinkWrite { path: PathBuf, reason: String },

    #[error("exiftool error: {0}")]
    Exiftool(String),

    #[error("Setup error: {0}")]
    Setup(String),
}

impl MigrationError {
    /// Whether this error must abort the whole run rather than a single item.
    pub fn is_fatal(&self) -> bool {
        match self {
            MigrationError::Setup(_) | MigrationError::Config(_) => true,
            MigrationError::Database(e) => sink_unreachable(e),
            _ => false,
        }
    }
}

/// SQLite failures that mean the target database itself is gone or unusable.
fn sink_unreachable(e: &rusqlite::Error) -> bool {
    use rusqlite::ErrorCode;

    match e.sqlite_error_code() {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::SystemIoFailure
            | ErrorCode::ReadOnly,
        ) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_item_errors_are_not_fatal() {
        let err = MigrationError::SinkWrite {
            path: PathBuf::from("/photos/a.jpg"),
            reason: "no photo or video row".to_string(),
        };
        assert!(!err.is_fatal());
        assert!(!MigrationError::Exiftool("exit status 1".to_string()).is_fatal());
    }

    #[test]
    fn test_setup_errors_are_fatal() {
        assert!(MigrationError::Setup("database unreachable".to_string()).is_fatal());
    }

    #[test]
    fn test_missing_row_is_not_fatal() {
        let err = MigrationError::Database(rusqlite::Error::QueryReturnedNoRows);
        assert!(!err.is_fatal());
    }
}
