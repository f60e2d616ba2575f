// ─── Lock Record ───
// Durable marker of what was last installed into a working directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::ConfigFile;
use crate::core::error::{StarterError, StarterResult};

pub const LOCK_FILE_NAME: &str = "serverstarter.lock";
const LOCK_HEADER: &str = "# Auto generated file, DO NOT EDIT!\n";

/// Persisted install state. Every field defaults so older or partial
/// records still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LockFile {
    pub pack_installed: bool,
    pub pack_url: String,
    pub loader_installed: bool,
    pub mc_version: Option<String>,
    pub loader_version: Option<String>,
    pub bootstrap_applied: bool,
    pub bootstrap_path: Option<PathBuf>,
    pub installed_at: Option<DateTime<Utc>>,
}

impl LockFile {
    /// Whether `desired` still needs to be installed over this record.
    ///
    /// The modpack source is the only version fingerprint: launch options
    /// and every other marker are ignored.
    pub fn should_install(&self, desired: &ConfigFile) -> bool {
        !self.pack_installed || self.pack_url != desired.install.modpack_url
    }
}

/// Reads and writes the lock record of one working directory.
#[derive(Debug, Clone)]
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(working_dir: &Path) -> Self {
        Self::new(working_dir.join(LOCK_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, or an empty one when no file exists yet.
    pub async fn load(&self) -> StarterResult<LockFile> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No lock file at {:?}, starting from an empty record", self.path);
                return Ok(LockFile::default());
            }
            Err(e) => return Err(StarterError::io(&self.path, e)),
        };

        // An empty document (only the header comment) deserializes to unit.
        if raw.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            return Ok(LockFile::default());
        }

        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Overwrite the record on disk.
    ///
    /// Written to a sibling temp file first and renamed over the old record,
    /// so a crash mid-write keeps the previous record intact.
    pub async fn save(&self, lock: &LockFile) -> StarterResult<()> {
        let body = format!("{}{}", LOCK_HEADER, serde_yaml::to_string(lock)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StarterError::io(parent, e))?;
            }
        }

        let tmp = self.path.with_extension("lock.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StarterError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StarterError::io(&self.path, e))?;

        debug!("Saved lock file {:?}: {:?}", self.path, lock);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired(url: &str) -> ConfigFile {
        let mut config = ConfigFile::default();
        config.install.modpack_url = url.to_string();
        config
    }

    #[test]
    fn empty_record_is_due() {
        assert!(LockFile::default().should_install(&desired("A")));
    }

    #[test]
    fn matching_record_is_not_due() {
        let lock = LockFile {
            pack_installed: true,
            pack_url: "A".into(),
            ..Default::default()
        };
        assert!(!lock.should_install(&desired("A")));
        // Pure: asking again gives the same answer.
        assert!(!lock.should_install(&desired("A")));
    }

    #[test]
    fn source_change_triggers_reinstall() {
        let lock = LockFile {
            pack_installed: true,
            pack_url: "A".into(),
            ..Default::default()
        };
        assert!(lock.should_install(&desired("B")));
    }

    #[test]
    fn launch_option_changes_are_ignored() {
        let lock = LockFile {
            pack_installed: true,
            pack_url: "A".into(),
            bootstrap_applied: false,
            ..Default::default()
        };
        let mut config = desired("A");
        config.launch.max_ram = "12G".into();
        config.launch.spongefix = true;
        assert!(!lock.should_install(&config));
    }

    #[tokio::test]
    async fn absent_file_loads_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = LockStore::in_dir(dir.path());
        assert_eq!(store.load().await.unwrap(), LockFile::default());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn save_then_load_keeps_header_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = LockStore::in_dir(dir.path());
        let lock = LockFile {
            pack_installed: true,
            pack_url: "https://example.com/pack.zip".into(),
            loader_installed: true,
            mc_version: Some("1.12.2".into()),
            loader_version: Some("14.23.5.2847".into()),
            ..Default::default()
        };

        store.save(&lock).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with(LOCK_HEADER));
        assert!(raw.contains("packInstalled: true"));
        assert_eq!(store.load().await.unwrap(), lock);
    }

    #[tokio::test]
    async fn header_only_file_is_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = LockStore::in_dir(dir.path());
        std::fs::write(store.path(), LOCK_HEADER).unwrap();
        assert_eq!(store.load().await.unwrap(), LockFile::default());
    }

    #[tokio::test]
    async fn partial_record_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = LockStore::in_dir(dir.path());
        std::fs::write(store.path(), "packInstalled: true\npackUrl: A\n").unwrap();

        let lock = store.load().await.unwrap();
        assert!(lock.pack_installed);
        assert_eq!(lock.pack_url, "A");
        assert!(!lock.bootstrap_applied);
    }
}
