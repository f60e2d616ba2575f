// ─── Install Steps ───
// The providers the orchestrator sequences. `LiveSteps` wires them to the
// real pack fetchers, the Forge installer and the file manager.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::core::bootstrap::install_sponge_bootstrapper;
use crate::core::config::ConfigFile;
use crate::core::downloader::Downloader;
use crate::core::error::{StarterError, StarterResult};
use crate::core::files::FileManager;
use crate::core::java::{check_java_for_minecraft, resolve_java_binary};
use crate::core::loaders::{ForgeContext, ForgeInstall, ForgeInstaller};
use crate::core::packs::{PackContext, PackInfo, PackInstaller};

#[async_trait]
pub trait InstallSteps: Send + Sync {
    async fn fetch_pack(&self, config: &ConfigFile) -> StarterResult<PackInfo>;

    async fn install_loader(
        &self,
        config: &ConfigFile,
        pack: &PackInfo,
    ) -> StarterResult<ForgeInstall>;

    /// Returns the path of the installed bootstrap jar.
    async fn install_bootstrap(&self, config: &ConfigFile) -> StarterResult<PathBuf>;

    async fn install_additional_files(&self, config: &ConfigFile) -> StarterResult<()>;

    async fn install_local_files(&self, config: &ConfigFile) -> StarterResult<()>;
}

pub struct LiveSteps<'a> {
    downloader: &'a Downloader,
    working_dir: &'a Path,
    base_path: PathBuf,
}

impl<'a> LiveSteps<'a> {
    pub fn new(downloader: &'a Downloader, working_dir: &'a Path, base_path: PathBuf) -> Self {
        Self {
            downloader,
            working_dir,
            base_path,
        }
    }

    fn files(&self) -> FileManager<'_> {
        FileManager::new(self.downloader, self.working_dir, &self.base_path)
    }
}

#[async_trait]
impl InstallSteps for LiveSteps<'_> {
    async fn fetch_pack(&self, config: &ConfigFile) -> StarterResult<PackInfo> {
        let format = config.pack_format()?;
        info!(
            "Fetching {} pack from {}",
            format, config.install.modpack_url
        );

        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StarterError::io(&self.base_path, e))?;

        let ctx = PackContext {
            config,
            working_dir: self.working_dir,
            base_path: &self.base_path,
            downloader: self.downloader,
        };
        let info = PackInstaller::new(format).fetch(&ctx).await?;
        info!("Pack staged, {} files installed", info.files_installed);
        Ok(info)
    }

    async fn install_loader(
        &self,
        config: &ConfigFile,
        pack: &PackInfo,
    ) -> StarterResult<ForgeInstall> {
        let (mc_version, forge_version) =
            match (pack.mc_version.as_deref(), pack.loader_version.as_deref()) {
                (Some(mc), Some(forge)) => (mc, forge),
                _ => {
                    return Err(StarterError::Loader(
                        "Minecraft and Forge versions are unknown, set install.mcVersion and install.loaderVersion".into(),
                    ))
                }
            };

        let java_bin = resolve_java_binary(&config.launch.forced_java_path)?;
        check_java_for_minecraft(&java_bin, mc_version);

        ForgeInstaller::new(self.downloader)
            .install(ForgeContext {
                base_path: &self.base_path,
                java_bin: &java_bin,
                mc_version,
                forge_version,
                installer_url: &config.install.installer_url,
                installer_arguments: &config.install.installer_arguments,
            })
            .await
    }

    async fn install_bootstrap(&self, config: &ConfigFile) -> StarterResult<PathBuf> {
        install_sponge_bootstrapper(
            self.downloader,
            &config.install.sponge_bootstrapper,
            &self.base_path,
        )
        .await
    }

    async fn install_additional_files(&self, config: &ConfigFile) -> StarterResult<()> {
        self.files()
            .install_additional_files(&config.install.additional_files)
            .await
    }

    async fn install_local_files(&self, config: &ConfigFile) -> StarterResult<()> {
        self.files()
            .install_local_files(&config.install.local_files)
            .await
    }
}
