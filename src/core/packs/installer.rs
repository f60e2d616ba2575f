use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::PackFormat;
use crate::core::error::StarterResult;

use super::{context::PackContext, curse::CursePack, server_zip::ZipPack};

/// What a fetched pack tells the later install steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    pub mc_version: Option<String>,
    /// Forge version without the Minecraft prefix.
    pub loader_version: Option<String>,
    /// Files written into the install root.
    pub files_installed: usize,
}

#[async_trait]
pub trait PackType: Send + Sync {
    /// Stage the pack content into the install root.
    async fn fetch(&self, ctx: &PackContext<'_>) -> StarterResult<PackInfo>;
}

/// Static dispatcher, one variant per supported format.
pub enum PackInstaller {
    Curse(CursePack),
    Zip(ZipPack),
}

impl PackInstaller {
    pub fn new(format: PackFormat) -> Self {
        match format {
            PackFormat::Curse => Self::Curse(CursePack),
            PackFormat::Zip => Self::Zip(ZipPack),
        }
    }

    pub async fn fetch(&self, ctx: &PackContext<'_>) -> StarterResult<PackInfo> {
        let info = match self {
            PackInstaller::Curse(p) => p.fetch(ctx).await?,
            PackInstaller::Zip(p) => p.fetch(ctx).await?,
        };
        Ok(info.with_fallback(ctx))
    }
}

impl PackInfo {
    /// Fill versions the pack did not declare from the config.
    fn with_fallback(mut self, ctx: &PackContext<'_>) -> Self {
        let install = &ctx.config.install;
        if self.mc_version.is_none() && !install.mc_version.is_empty() {
            self.mc_version = Some(install.mc_version.clone());
        }
        if self.loader_version.is_none() && !install.loader_version.is_empty() {
            self.loader_version = Some(install.loader_version.clone());
        }
        self
    }
}
