use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use covsnap_shared::{util::BytesFmt, SnapshotName, COVERAGE_DIR};

use crate::{
    agent::{AgentSlot, RUNTIME_AGENT},
    clock::{Clock, SystemClock},
    error::ExportError,
    host::HostContext,
    stream::OutputStream,
};

/// Writes coverage snapshots of the running process.
///
/// The exporter holds no state between calls: the agent is looked up and the
/// artifact path computed anew on every export.
pub struct SnapshotExporter {
    agents: Arc<AgentSlot>,
    agent_name: String,
    clock: Box<dyn Clock>,
}

impl Default for SnapshotExporter {
    fn default() -> Self {
        Self::new(AgentSlot::global())
    }
}

impl SnapshotExporter {
    /// Exporter reading from the agent registered as [`RUNTIME_AGENT`] in `agents`.
    pub fn new(agents: Arc<AgentSlot>) -> Self {
        SnapshotExporter {
            agents,
            agent_name: RUNTIME_AGENT.to_owned(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = name.into();
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Dumps the current coverage data to a new artifact, or appends it to
    /// an existing one with the same name.
    ///
    /// Never fails: errors are logged and the host keeps running.
    pub fn export(&self, host: &dyn HostContext, tag: &str, append: bool) {
        log::debug!("Dump coverage data! (tag: {tag:?}, append: {append})");
        if let Err(err) = self.try_export(host, tag, append) {
            log::error!("Coverage dump failed: {err}");
        }
    }

    /// Same as [`SnapshotExporter::export`], but returns the path of the
    /// artifact or the reason the export was abandoned.
    ///
    /// `Ok` means the data was written, not that it reached the disk: a failed
    /// sync on close is only logged.
    pub fn try_export(
        &self,
        host: &dyn HostContext,
        tag: &str,
        append: bool,
    ) -> Result<PathBuf, ExportError> {
        let sub = Path::new(COVERAGE_DIR).join(host.application_id());
        let base_dir = host
            .external_files_dir(&sub)
            .ok_or(ExportError::StorageUnavailable)?;

        let name = SnapshotName::new(self.clock.now(), tag)?;
        let path = base_dir.join(&name);

        // A tag with slashes puts the artifact in a subdirectory.
        ensure_dir(path.parent().unwrap_or(base_dir.as_path()))?;

        let mut out = OutputStream::open(&path, append).map_err(|source| {
            ExportError::OutputFailed {
                path: path.clone(),
                source,
            }
        })?;

        let agent = self
            .agents
            .lookup(&self.agent_name)
            .ok_or_else(|| ExportError::AgentUnavailable {
                name: self.agent_name.clone(),
            })?;
        // Counters are shared with the rest of the process; never reset them.
        let data = agent
            .execution_data(false)
            .map_err(|source| ExportError::AgentInvocationFailed {
                name: self.agent_name.clone(),
                source,
            })?;

        out.write_all(&data)
            .map_err(|source| ExportError::OutputFailed {
                path: path.clone(),
                source,
            })?;
        out.close();

        let path = fs::canonicalize(&path).unwrap_or(path);
        log::debug!(
            "Coverage saved: {} ({})",
            path.display(),
            BytesFmt(data.len() as u64)
        );
        Ok(path)
    }
}

/// Creates `dir` and its ancestors. Losing a creation race against another
/// export is fine: only the directory existing afterwards matters.
fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    if dir.is_dir() {
        return Ok(());
    }
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(_) if dir.is_dir() => Ok(()),
        Err(source) => Err(ExportError::DirectoryCreateFailed {
            path: dir.to_owned(),
            source,
        }),
    }
}
