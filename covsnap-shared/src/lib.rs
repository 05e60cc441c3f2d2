pub mod config;
pub mod name;
pub mod util;

pub use config::*;
pub use name::SnapshotName;

/// Category label of the artifact directory, below the external files area.
pub const COVERAGE_DIR: &str = "coverage";

/// Suffix appended to every artifact name.
pub const ARTIFACT_SUFFIX: &str = "_coverage.ec";

/// chrono format of the timestamp prefix, e.g. `2025-03-10-14:05:30`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// Tag used by the default-wired trigger.
pub const DEFAULT_TAG: &str = "broadcast";
