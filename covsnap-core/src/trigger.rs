use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use covsnap_shared::{TriggerConfig, TriggerSignal, DEFAULT_TAG};
use tokio::{
    signal::unix::{signal, SignalKind},
    task::JoinSet,
};

use crate::{exporter::SnapshotExporter, host::HostContext};

/// The arguments an external event passes to an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub tag: String,
    pub append: bool,
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger {
            tag: DEFAULT_TAG.to_owned(),
            append: false,
        }
    }
}

impl From<&TriggerConfig> for Trigger {
    fn from(config: &TriggerConfig) -> Self {
        Trigger {
            tag: config.tag.clone(),
            append: config.append,
        }
    }
}

impl SnapshotExporter {
    pub fn on_trigger(&self, host: &dyn HostContext, trigger: &Trigger) {
        log::debug!("Coverage trigger received! (tag: {:?})", trigger.tag);
        self.export(host, &trigger.tag, trigger.append);
    }
}

fn signal_kind(signal: TriggerSignal) -> SignalKind {
    match signal {
        TriggerSignal::Usr1 => SignalKind::user_defined1(),
        TriggerSignal::Usr2 => SignalKind::user_defined2(),
        TriggerSignal::Hup => SignalKind::hangup(),
    }
}

/// Installs a handler for every configured signal. Each delivery runs one
/// export on the blocking pool; deliveries of the same signal are handled one
/// after the other.
///
/// Must be called from within a tokio runtime.
pub fn install(
    exporter: Arc<SnapshotExporter>,
    host: Arc<dyn HostContext>,
    triggers: &[TriggerConfig],
) -> Result<JoinSet<()>> {
    ensure!(!triggers.is_empty(), "no coverage triggers configured");

    let mut tasks = JoinSet::new();
    for config in triggers {
        let mut stream = signal(signal_kind(config.signal))
            .with_context(|| format!("failed to register handler for {}", config.signal))?;
        let name = config.signal;
        let trigger = Trigger::from(config);
        let exporter = exporter.clone();
        let host = host.clone();
        tasks.spawn(async move {
            while let Some(()) = stream.recv().await {
                log::info!("{name} received, exporting coverage as {:?}", trigger.tag);
                let exporter = exporter.clone();
                let host = host.clone();
                let trigger = trigger.clone();
                let task =
                    tokio::task::spawn_blocking(move || exporter.on_trigger(&*host, &trigger));
                if let Err(e) = task.await {
                    log::error!("Coverage export task failed: {e}");
                }
            }
        });
        log::debug!("Listening for {} (tag: {:?})", config.signal, config.tag);
    }
    Ok(tasks)
}

/// Runs the handlers of [`install`] until they all stop.
pub async fn listen(
    exporter: Arc<SnapshotExporter>,
    host: Arc<dyn HostContext>,
    triggers: &[TriggerConfig],
) -> Result<()> {
    let mut tasks = install(exporter, host, triggers)?;
    while let Some(res) = tasks.join_next().await {
        res.context("signal handler task failed")?;
    }
    Ok(())
}
