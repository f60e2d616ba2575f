// ─── Curse Pack ───
// CurseForge export: manifest.json + overrides/ + a list of project files.

use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::context::PackContext;
use super::installer::{PackInfo, PackType};
use crate::core::archive::{self, ExtractOptions};
use crate::core::error::{StarterError, StarterResult};

const MANIFEST_NAME: &str = "manifest.json";
const MOD_DOWNLOAD_CONCURRENCY: usize = 8;

pub struct CursePack;

/// Subset of a CurseForge `manifest.json`.
#[derive(Debug, Deserialize)]
pub struct CurseManifest {
    pub minecraft: CurseMinecraft,
    #[serde(default)]
    pub files: Vec<CurseFile>,
    #[serde(default = "default_overrides")]
    pub overrides: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseMinecraft {
    pub version: String,
    #[serde(default)]
    pub mod_loaders: Vec<CurseModLoader>,
}

#[derive(Debug, Deserialize)]
pub struct CurseModLoader {
    pub id: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurseFile {
    #[serde(rename = "projectID")]
    pub project_id: u64,
    #[serde(rename = "fileID")]
    pub file_id: u64,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_overrides() -> String {
    "overrides".to_string()
}

fn default_required() -> bool {
    true
}

impl CurseManifest {
    /// Forge version of the primary loader (`forge-14.23.5.2847`).
    pub fn forge_version(&self) -> Option<String> {
        let loader = self
            .minecraft
            .mod_loaders
            .iter()
            .find(|l| l.primary)
            .or_else(|| self.minecraft.mod_loaders.first())?;

        match loader.id.strip_prefix("forge-") {
            Some(version) => Some(version.to_string()),
            None => {
                warn!("Primary mod loader {} is not Forge", loader.id);
                None
            }
        }
    }

    /// Project files to download, minus the ignored projects.
    pub fn wanted_files(&self, ignore_projects: &[u64]) -> Vec<CurseFile> {
        self.files
            .iter()
            .filter(|f| f.required && !ignore_projects.contains(&f.project_id))
            .cloned()
            .collect()
    }
}

/// Expand the `{projectId}`/`{fileId}` download template.
pub fn mod_download_url(template: &str, file: &CurseFile) -> String {
    template
        .replace("{projectId}", &file.project_id.to_string())
        .replace("{fileId}", &file.file_id.to_string())
}

#[async_trait::async_trait]
impl PackType for CursePack {
    async fn fetch(&self, ctx: &PackContext<'_>) -> StarterResult<PackInfo> {
        ctx.reset_mods_dir().await?;
        let (manifest, overrides_written) = ctx
            .obtain_archive()
            .await?
            .extract_then_cleanup(|archive| {
                unpack_overrides(archive, ctx.base_path, &ctx.config.install.ignore_files)
            })
            .await?;

        info!(
            "Curse pack for Minecraft {} with {} project files, {} override files",
            manifest.minecraft.version,
            manifest.files.len(),
            overrides_written
        );

        let format_specific = &ctx.config.install.format_specific;
        let wanted = manifest.wanted_files(&format_specific.ignore_project);
        let skipped = manifest.files.len() - wanted.len();
        if skipped > 0 {
            info!("Skipping {} ignored or optional projects", skipped);
        }

        let mods_dir = ctx.mods_dir();
        let downloaded =
            download_mods(ctx, &format_specific.mod_download_url, wanted, &mods_dir).await?;

        Ok(PackInfo {
            mc_version: Some(manifest.minecraft.version.clone()),
            loader_version: manifest.forge_version(),
            files_installed: overrides_written + downloaded,
        })
    }
}

fn unpack_overrides(
    archive_path: &Path,
    base_path: &Path,
    ignore: &[String],
) -> StarterResult<(CurseManifest, usize)> {
    let mut zip = archive::open_zip(archive_path)?;
    let raw = archive::read_entry(&mut zip, MANIFEST_NAME)?.ok_or_else(|| {
        StarterError::Pack(format!(
            "{} has no {}, is it a curse pack?",
            archive_path.display(),
            MANIFEST_NAME
        ))
    })?;
    let manifest: CurseManifest = serde_json::from_str(&raw)?;

    let written = archive::extract_zip(
        &mut zip,
        base_path,
        ExtractOptions {
            strip_prefix: Some(&manifest.overrides),
            ignore,
        },
    )?;

    Ok((manifest, written))
}

async fn download_mods(
    ctx: &PackContext<'_>,
    template: &str,
    files: Vec<CurseFile>,
    mods_dir: &Path,
) -> StarterResult<usize> {
    let total = files.len();
    info!("Downloading {} mods into {:?}", total, mods_dir);

    let results: Vec<(CurseFile, StarterResult<PathBuf>)> = stream::iter(files)
        .map(|file| async move {
            let url = mod_download_url(template, &file);
            let result = ctx.downloader.download_into_dir(&url, mods_dir).await;
            (file, result)
        })
        .buffer_unordered(MOD_DOWNLOAD_CONCURRENCY)
        .collect()
        .await;

    let mut failures = Vec::new();
    for (file, result) in results {
        match result {
            Ok(path) => debug!("Mod {}/{} -> {:?}", file.project_id, file.file_id, path),
            Err(e) => {
                warn!(
                    "Failed to download project {} file {}: {}",
                    file.project_id, file.file_id, e
                );
                failures.push(format!("{}/{}", file.project_id, file.file_id));
            }
        }
    }

    if !failures.is_empty() {
        return Err(StarterError::Pack(format!(
            "{} of {} mods failed to download: {}",
            failures.len(),
            total,
            failures.join(", ")
        )));
    }

    Ok(total)
}
