use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::config::ConfigFile;
use crate::core::downloader::{Downloader, Source};
use crate::core::error::{StarterError, StarterResult};

const PACK_DOWNLOAD_NAME: &str = "modpack-download.zip";

/// Everything a pack format needs to stage its content.
pub struct PackContext<'a> {
    pub config: &'a ConfigFile,
    pub working_dir: &'a Path,
    pub base_path: &'a Path,
    pub downloader: &'a Downloader,
}

/// The pack archive on local disk.
pub struct PackArchive {
    pub path: PathBuf,
    /// Downloaded by us, removed once extracted.
    temporary: bool,
}

impl PackContext<'_> {
    pub fn mods_dir(&self) -> PathBuf {
        self.base_path.join("mods")
    }

    /// Make the modpack archive available locally. Remote packs are
    /// downloaded into the install root; local packs are used in place.
    pub async fn obtain_archive(&self) -> StarterResult<PackArchive> {
        let url = &self.config.install.modpack_url;
        match Source::parse(url, self.working_dir) {
            Source::Local(path) => {
                if !path.is_file() {
                    return Err(StarterError::Pack(format!(
                        "Local modpack file not found: {}",
                        path.display()
                    )));
                }
                info!("Using local modpack {:?}", path);
                Ok(PackArchive {
                    path,
                    temporary: false,
                })
            }
            Source::Remote(remote) => {
                info!("Downloading modpack from {}", remote);
                let dest = self.base_path.join(PACK_DOWNLOAD_NAME);
                self.downloader.download_file(&remote, &dest, None).await?;
                Ok(PackArchive {
                    path: dest,
                    temporary: true,
                })
            }
        }
    }

    /// Empty `mods/` so a pack update cannot leave stale jars behind.
    pub async fn reset_mods_dir(&self) -> StarterResult<()> {
        let mods_dir = self.mods_dir();
        if mods_dir.exists() {
            debug!("Clearing {:?}", mods_dir);
            tokio::fs::remove_dir_all(&mods_dir)
                .await
                .map_err(|e| StarterError::io(&mods_dir, e))?;
        }
        tokio::fs::create_dir_all(&mods_dir)
            .await
            .map_err(|e| StarterError::io(&mods_dir, e))
    }
}

impl PackArchive {
    /// Run `extract` on the archive, then drop a downloaded archive whether
    /// or not extraction succeeded.
    pub async fn extract_then_cleanup<T>(
        self,
        extract: impl FnOnce(&Path) -> StarterResult<T>,
    ) -> StarterResult<T> {
        let result = extract(&self.path);
        if self.temporary {
            if let Err(e) = tokio::fs::remove_file(&self.path).await {
                debug!("Could not remove {:?}: {}", self.path, e);
            }
        }
        result
    }
}
