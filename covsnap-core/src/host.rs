use std::path::{Path, PathBuf};

use covsnap_shared::Config;

/// What the exporter needs to know about the process it is embedded in.
pub trait HostContext: Send + Sync {
    fn application_id(&self) -> &str;

    /// Returns `sub` inside the application's external files area, or `None`
    /// if that area is not available right now.
    fn external_files_dir(&self, sub: &Path) -> Option<PathBuf>;
}

/// A host whose external files area is a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalHost {
    storage_root: Option<PathBuf>,
    application_id: String,
}

impl LocalHost {
    pub fn new(storage_root: Option<PathBuf>, application_id: impl Into<String>) -> Self {
        LocalHost {
            storage_root,
            application_id: application_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.storage_root.clone(), config.application_id.clone())
    }
}

impl HostContext for LocalHost {
    fn application_id(&self) -> &str {
        &self.application_id
    }

    fn external_files_dir(&self, sub: &Path) -> Option<PathBuf> {
        // A root that is gone behaves like unmounted storage.
        let root = self.storage_root.as_ref().filter(|root| root.is_dir())?;
        Some(root.join(sub))
    }
}
