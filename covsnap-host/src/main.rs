use std::{fs::File, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use covsnap_core::{trigger, AgentSlot, HostContext, LocalHost, SnapshotExporter, Trigger};
use covsnap_shared::Config;

/// Command line arguments for covsnap-host.
#[derive(Parser, Debug)]
struct CovsnapOptions {
    /// YAML configuration file. Defaults are used when omitted.
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Root of the external files area; overrides the configuration.
    #[clap(short, long)]
    storage_root: Option<PathBuf>,
    /// Application identifier; overrides the configuration.
    #[clap(short, long)]
    application_id: Option<String>,
    /// Export a single snapshot and exit instead of waiting for signals.
    #[clap(long)]
    once: bool,
    /// Tag of the snapshot written with `--once`.
    #[clap(long, default_value = covsnap_shared::DEFAULT_TAG, requires = "once")]
    tag: String,
    /// Append to an existing snapshot with the same name when using `--once`.
    #[clap(long, requires = "once")]
    append: bool,
}

fn load_config(options: &CovsnapOptions) -> Result<Config> {
    let mut config = match &options.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("open config file: {}", path.display()))?;
            serde_yaml::from_reader(file)
                .with_context(|| format!("deserialize config from {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(storage_root) = &options.storage_root {
        config.storage_root = Some(storage_root.clone());
    }
    if let Some(application_id) = &options.application_id {
        config.application_id = application_id.clone();
    }
    Ok(config)
}

fn register_agent(
    #[cfg_attr(not(feature = "minicov"), allow(unused_variables))] agents: &AgentSlot,
) {
    #[cfg(feature = "minicov")]
    {
        agents.register(
            covsnap_core::RUNTIME_AGENT,
            Arc::new(covsnap_core::agent::MinicovAgent::new()),
        );
        log::info!("Registered minicov coverage agent");
    }
    #[cfg(not(feature = "minicov"))]
    {
        log::warn!("No coverage agent linked in; exports will fail");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let options = CovsnapOptions::parse();
    let config = load_config(&options)?;

    let agents = AgentSlot::global();
    register_agent(&agents);

    let exporter = Arc::new(SnapshotExporter::new(agents));
    let host: Arc<dyn HostContext> = Arc::new(LocalHost::from_config(&config));

    if options.once {
        let trigger = Trigger {
            tag: options.tag,
            append: options.append,
        };
        tokio::task::spawn_blocking(move || exporter.on_trigger(&*host, &trigger)).await?;
        return Ok(());
    }

    log::info!(
        "Exporting coverage of {} on {}",
        config.application_id,
        config
            .triggers
            .iter()
            .map(|t| t.signal.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for ctrl-c")?;
            log::info!("Interrupted, shutting down");
        }
        res = trigger::listen(exporter, host, &config.triggers) => res?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use covsnap_shared::TriggerSignal;
    use mktemp::Temp;

    #[test]
    fn test_defaults() {
        let options = CovsnapOptions::try_parse_from(["covsnap-host"]).unwrap();
        assert!(!options.once);
        assert_eq!(options.tag, "broadcast");
        assert_eq!(load_config(&options).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let dir = Temp::new_dir().unwrap();
        let path = dir.as_path().join("config.yaml");
        std::fs::write(
            &path,
            "application_id: com.example.app\ntriggers:\n  - signal: hup\n    tag: reload\n",
        )
        .unwrap();

        let options = CovsnapOptions::try_parse_from([
            "covsnap-host",
            "--config",
            path.to_str().unwrap(),
            "--storage-root",
            "/data/ext",
        ])
        .unwrap();
        let config = load_config(&options).unwrap();
        assert_eq!(config.application_id, "com.example.app");
        assert_eq!(config.storage_root, Some(PathBuf::from("/data/ext")));
        assert_eq!(config.triggers[0].signal, TriggerSignal::Hup);
        assert_eq!(config.triggers[0].tag, "reload");
    }

    #[test]
    fn test_tag_requires_once() {
        assert!(CovsnapOptions::try_parse_from(["covsnap-host", "--tag", "manual"]).is_err());
        assert!(CovsnapOptions::try_parse_from(["covsnap-host", "--append"]).is_err());

        let options =
            CovsnapOptions::try_parse_from(["covsnap-host", "--once", "--tag", "manual", "--append"])
                .unwrap();
        assert!(options.once && options.append);
        assert_eq!(options.tag, "manual");
    }

    #[test]
    fn test_missing_config() {
        let options =
            CovsnapOptions::try_parse_from(["covsnap-host", "-c", "/nonexistent/config.yaml"])
                .unwrap();
        assert!(load_config(&options).is_err());
    }
}
