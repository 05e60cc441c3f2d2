use core::fmt::Display;
use core::str::FromStr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_TAG;

/// Unix signals that can trigger a snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSignal {
    Usr1,
    Usr2,
    Hup,
}

impl FromStr for TriggerSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().trim_start_matches("sig") {
            "usr1" => Ok(TriggerSignal::Usr1),
            "usr2" => Ok(TriggerSignal::Usr2),
            "hup" => Ok(TriggerSignal::Hup),
            _ => Err(format!("unknown trigger signal: {}", s)),
        }
    }
}

impl Display for TriggerSignal {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        match self {
            TriggerSignal::Usr1 => write!(fmt, "SIGUSR1"),
            TriggerSignal::Usr2 => write!(fmt, "SIGUSR2"),
            TriggerSignal::Hup => write!(fmt, "SIGHUP"),
        }
    }
}

/// Binds a signal to the tag and append mode of the export it triggers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerConfig {
    pub signal: TriggerSignal,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub append: bool,
}

fn default_tag() -> String {
    DEFAULT_TAG.to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Root of the external files area. When absent, storage is considered
    /// unavailable and every export is skipped.
    pub storage_root: Option<PathBuf>,
    /// Namespaces the artifacts of this application below `coverage/`.
    pub application_id: String,
    pub triggers: Vec<TriggerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_root: None,
            application_id: "covsnap".to_owned(),
            triggers: vec![TriggerConfig {
                signal: TriggerSignal::Usr1,
                tag: default_tag(),
                append: false,
            }],
        }
    }
}
