use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::downloader::Downloader;
use crate::core::error::{StarterError, StarterResult};
use crate::core::maven::{forge_id, MavenArtifact, FORGE_MAVEN};

/// Inputs of one Forge server install.
pub struct ForgeContext<'a> {
    pub base_path: &'a Path,
    pub java_bin: &'a Path,
    pub mc_version: &'a str,
    pub forge_version: &'a str,
    /// Optional override, may use `{mcVersion}` and `{loaderVersion}`.
    pub installer_url: &'a str,
    pub installer_arguments: &'a [String],
}

/// Versions a successful install leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeInstall {
    pub mc_version: String,
    pub forge_version: String,
}

/// Installs a Forge server by downloading and executing the official
/// installer JAR in the install root.
pub struct ForgeInstaller<'a> {
    downloader: &'a Downloader,
}

impl<'a> ForgeInstaller<'a> {
    pub fn new(downloader: &'a Downloader) -> Self {
        Self { downloader }
    }

    pub async fn install(&self, ctx: ForgeContext<'_>) -> StarterResult<ForgeInstall> {
        info!(
            "Installing Forge {} for MC {}",
            ctx.forge_version, ctx.mc_version
        );

        let installer_url = installer_url(&ctx);
        let base_path = std::path::absolute(ctx.base_path)
            .map_err(|e| StarterError::io(ctx.base_path, e))?;
        let installer_path = installer_path(&base_path, ctx.mc_version, ctx.forge_version);

        self.downloader
            .download_file(&installer_url, &installer_path, None)
            .await?;

        let output = tokio::process::Command::new(ctx.java_bin)
            .arg("-jar")
            .arg(&installer_path)
            .args(ctx.installer_arguments)
            .current_dir(&base_path)
            .output()
            .await
            .map_err(|e| StarterError::JavaExecution(e.to_string()))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[forge-installer] {}", line);
        }

        if !output.status.success() {
            return Err(StarterError::Loader(format!(
                "Forge installer failed (code {:?})\nSTDOUT:\n{}\nSTDERR:\n{}",
                output.status.code(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let _ = tokio::fs::remove_file(&installer_path).await;
        let _ = tokio::fs::remove_file(installer_log_path(&installer_path)).await;

        info!(
            "Forge {} installed successfully",
            forge_id(ctx.mc_version, ctx.forge_version)
        );

        Ok(ForgeInstall {
            mc_version: ctx.mc_version.to_string(),
            forge_version: ctx.forge_version.to_string(),
        })
    }
}

fn installer_url(ctx: &ForgeContext<'_>) -> String {
    if ctx.installer_url.is_empty() {
        MavenArtifact::forge_installer(ctx.mc_version, ctx.forge_version).url(FORGE_MAVEN)
    } else {
        ctx.installer_url
            .replace("{mcVersion}", ctx.mc_version)
            .replace("{loaderVersion}", ctx.forge_version)
    }
}

fn installer_path(base_path: &Path, mc_version: &str, forge_version: &str) -> PathBuf {
    base_path.join(MavenArtifact::forge_installer(mc_version, forge_version).filename())
}

/// The installer writes `<installer>.jar.log` next to itself.
fn installer_log_path(installer_path: &Path) -> PathBuf {
    let mut name = installer_path.file_name().unwrap_or_default().to_os_string();
    name.push(".log");
    installer_path.with_file_name(name)
}

// ─── Launch entry detection ───

/// How the installed server is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEntry {
    /// `java -jar <jar>` (Forge up to 1.16, sponge bootstrap, custom start file).
    Jar(PathBuf),
    /// `java @<args file>` (Forge 1.17+ writes `unix_args.txt`/`win_args.txt`).
    ArgsFile(PathBuf),
}

/// Find what to launch in `base_path` for the given versions.
///
/// Modern args files win over jars; without versions any `forge-*.jar` in
/// the install root is used.
pub fn detect_server_entry(
    base_path: &Path,
    mc_version: Option<&str>,
    forge_version: Option<&str>,
) -> Option<ServerEntry> {
    if let (Some(mc), Some(forge)) = (mc_version, forge_version) {
        let id = forge_id(mc, forge);
        let args_name = if cfg!(windows) {
            "win_args.txt"
        } else {
            "unix_args.txt"
        };
        let version_dir = base_path
            .join("libraries")
            .join(MavenArtifact::forge(mc, forge, None).version_dir());
        let args_file = version_dir.join(args_name);
        if args_file.is_file() {
            return Some(ServerEntry::ArgsFile(args_file));
        }

        for candidate in [
            format!("forge-{}.jar", id),
            format!("forge-{}-universal.jar", id),
            format!("forge-{}-server.jar", id),
        ] {
            let path = base_path.join(candidate);
            if path.is_file() {
                return Some(ServerEntry::Jar(path));
            }
        }
    }

    let mut jars: Vec<PathBuf> = std::fs::read_dir(base_path)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_forge_server_jar(p))
        .collect();
    jars.sort();
    jars.pop().map(ServerEntry::Jar)
}

fn is_forge_server_jar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("forge-") && n.ends_with(".jar") && !n.contains("installer"))
}
