use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, RwLock},
};

use crate::error::AgentError;

/// Name under which the coverage runtime of the process is registered.
pub const RUNTIME_AGENT: &str = "coverage-runtime";

/// An in-process coverage runtime.
///
/// The counters behind an agent are shared with the rest of the process and
/// keep changing while a snapshot is taken; implementations are responsible
/// for their own synchronization.
pub trait CoverageAgent: Send + Sync {
    /// Returns the execution data accumulated so far, resetting the counters
    /// afterwards if `reset` is set.
    fn execution_data(&self, reset: bool) -> Result<Vec<u8>, AgentError>;
}

/// Agents available to the exporter, keyed by name.
///
/// Agents are looked up on every export, so an agent registered after the
/// exporter was built is still picked up.
#[derive(Default)]
pub struct AgentSlot {
    agents: RwLock<HashMap<String, Arc<dyn CoverageAgent>>>,
}

impl AgentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide slot, filled at process start.
    pub fn global() -> Arc<AgentSlot> {
        static GLOBAL: OnceLock<Arc<AgentSlot>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(AgentSlot::new())).clone()
    }

    /// Registers `agent` under `name`, returning the agent it replaces.
    pub fn register(
        &self,
        name: impl Into<String>,
        agent: Arc<dyn CoverageAgent>,
    ) -> Option<Arc<dyn CoverageAgent>> {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        agents.insert(name.into(), agent)
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<dyn CoverageAgent>> {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        agents.remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn CoverageAgent>> {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        agents.get(name).cloned()
    }
}

#[cfg(feature = "minicov")]
pub use self::minicov_agent::MinicovAgent;

#[cfg(feature = "minicov")]
mod minicov_agent {
    use std::sync::Mutex;

    use super::CoverageAgent;
    use crate::error::AgentError;

    /// LLVM source-based coverage of the current process, captured through
    /// the `minicov` runtime. The binary must be built with
    /// `-Cinstrument-coverage`.
    #[derive(Default)]
    pub struct MinicovAgent {
        lock: Mutex<()>,
    }

    impl MinicovAgent {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl CoverageAgent for MinicovAgent {
        fn execution_data(&self, reset: bool) -> Result<Vec<u8>, AgentError> {
            let _guard = self.lock.lock().map_err(|_| AgentError::Poisoned)?;
            let mut coverage = vec![];
            // SAFETY: the runtime is only entered while holding `lock`.
            unsafe { minicov::capture_coverage(&mut coverage) }
                .map_err(|e| AgentError::Capture(format!("{e:?}")))?;
            if reset {
                // SAFETY: as above.
                unsafe { minicov::reset_coverage() };
            }
            Ok(coverage)
        }
    }
}
