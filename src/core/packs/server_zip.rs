use std::path::Path;

use tracing::info;

use super::context::PackContext;
use super::installer::{PackInfo, PackType};
use crate::core::archive::{self, ExtractOptions};
use crate::core::error::StarterResult;

/// A ready-made server zip. Versions come from the config.
pub struct ZipPack;

#[async_trait::async_trait]
impl PackType for ZipPack {
    async fn fetch(&self, ctx: &PackContext<'_>) -> StarterResult<PackInfo> {
        ctx.reset_mods_dir().await?;
        let written = ctx
            .obtain_archive()
            .await?
            .extract_then_cleanup(|archive| {
                unpack(archive, ctx.base_path, &ctx.config.install.ignore_files)
            })
            .await?;

        info!("Extracted {} files from zip pack", written);

        Ok(PackInfo {
            mc_version: None,
            loader_version: None,
            files_installed: written,
        })
    }
}

fn unpack(archive_path: &Path, base_path: &Path, ignore: &[String]) -> StarterResult<usize> {
    let mut zip = archive::open_zip(archive_path)?;
    // Server zips are often wrapped in a single folder named after the pack.
    let root = archive::common_root(&zip);
    archive::extract_zip(
        &mut zip,
        base_path,
        ExtractOptions {
            strip_prefix: root.as_deref(),
            ignore,
        },
    )
}
