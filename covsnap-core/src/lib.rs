//! Exports the coverage counters of the running process to local storage.
//!
//! A [`SnapshotExporter`] asks the coverage agent registered in an
//! [`AgentSlot`] for its execution data and writes it to
//! `<external files>/coverage/<application id>/<timestamp>_<tag>_coverage.ec`.
//! Failures are logged and never reach the caller.

pub mod agent;
pub mod clock;
pub mod error;
pub mod exporter;
pub mod host;
mod stream;
#[cfg(test)]
mod test_log;
pub mod trigger;

pub use agent::{AgentSlot, CoverageAgent, RUNTIME_AGENT};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AgentError, ExportError};
pub use exporter::SnapshotExporter;
pub use host::{HostContext, LocalHost};
pub use trigger::Trigger;
