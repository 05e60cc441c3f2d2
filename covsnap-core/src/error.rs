use std::{io, path::PathBuf};

use covsnap_shared::name::TagError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("failed to capture coverage: {0}")]
    Capture(String),
    #[error("agent state is poisoned")]
    Poisoned,
}

/// Why an export did not produce an artifact.
///
/// `StreamCloseFailed` is only ever logged by the output stream when it is
/// released; it is never returned from an export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("External storage not available")]
    StorageUnavailable,
    #[error("Invalid tag: {0}")]
    InvalidTag(#[from] TagError),
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreateFailed { path: PathBuf, source: io::Error },
    #[error("Failed to write {}: {source}", path.display())]
    OutputFailed { path: PathBuf, source: io::Error },
    #[error("Coverage agent `{name}` is not registered")]
    AgentUnavailable { name: String },
    #[error("Coverage agent `{name}` failed: {source}")]
    AgentInvocationFailed { name: String, source: AgentError },
    #[error("Stream close failed for {}: {source}", path.display())]
    StreamCloseFailed { path: PathBuf, source: io::Error },
}
