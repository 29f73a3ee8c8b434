// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirrorError>;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Checkout failed: {0}")]
    Checkout(String),

    #[error("Update failed: {0}")]
    Update(String),

    #[error("Source path does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scheduler error: {0}")]
    Schedule(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

impl MirrorError {
    /// Names the sync phase an error belongs to, for operator-facing logs.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Checkout(_) | Self::Update(_) | Self::Git(_) => "fetch",
            Self::SourceMissing(_) | Self::FileOperation { .. } | Self::Io(_) => "copy",
            Self::Schedule(_) => "schedule",
        }
    }
}
