use core::fmt::Display;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::{ARTIFACT_SUFFIX, TIMESTAMP_FORMAT};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TagError {
    #[error("tag {0:?} leaves the artifact directory")]
    ParentDir(String),
    #[error("tag {0:?} contains a NUL byte")]
    Nul(String),
}

/// File name of one coverage snapshot: `<timestamp>_<tag>_coverage.ec`.
///
/// Two snapshots taken within the same second with the same tag get the same
/// name; whether the second one overwrites or extends the first is decided by
/// the append flag of the export, not here.
///
/// Slashes in the tag are kept and put the artifact in a subdirectory; `..`
/// components are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotName(String);

impl SnapshotName {
    pub fn new(time: NaiveDateTime, tag: &str) -> Result<Self, TagError> {
        if tag.split(['/', '\\']).any(|part| part == "..") {
            return Err(TagError::ParentDir(tag.to_owned()));
        }
        if tag.contains('\0') {
            return Err(TagError::Nul(tag.to_owned()));
        }
        Ok(SnapshotName(format!(
            "{}_{}{}",
            time.format(TIMESTAMP_FORMAT),
            tag,
            ARTIFACT_SUFFIX
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for SnapshotName {
    fn as_ref(&self) -> &std::path::Path {
        self.0.as_ref()
    }
}

impl Display for SnapshotName {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        fmt.write_str(&self.0)
    }
}
