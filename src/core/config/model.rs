use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{StarterError, StarterResult};

pub const DEFAULT_MOD_DOWNLOAD_URL: &str =
    "https://www.curseforge.com/api/v1/mods/{projectId}/files/{fileId}/download";

/// Supported modpack formats. Closed set, no magic strings past parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackFormat {
    /// CurseForge export: `manifest.json` + `overrides/` + project file list.
    Curse,
    /// Plain server zip extracted as-is.
    Zip,
}

impl FromStr for PackFormat {
    type Err = StarterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "curse" | "curseforge" | "twitch" => Ok(PackFormat::Curse),
            "zip" | "zipfile" => Ok(PackFormat::Zip),
            other => Err(StarterError::UnknownPackFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for PackFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackFormat::Curse => write!(f, "curse"),
            PackFormat::Zip => write!(f, "zip"),
        }
    }
}

/// Desired state read from `server-setup-config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(rename = "_specver")]
    pub spec_version: u32,
    pub modpack: ModpackSection,
    pub install: InstallSection,
    pub launch: LaunchSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModpackSection {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstallSection {
    pub mc_version: String,
    #[serde(alias = "forgeVersion")]
    pub loader_version: String,
    #[serde(alias = "forgeInstallerUrl")]
    pub installer_url: String,
    pub installer_arguments: Vec<String>,
    pub modpack_url: String,
    pub modpack_format: String,
    pub format_specific: FormatSpecific,
    pub base_install_path: String,
    pub ignore_files: Vec<String>,
    pub additional_files: Vec<AdditionalFile>,
    pub local_files: Vec<LocalFile>,
    #[serde(alias = "installForge")]
    pub install_loader: bool,
    pub sponge_bootstrapper: String,
    /// Seconds.
    pub connect_timeout: u64,
    /// Seconds.
    pub read_timeout: u64,
}

impl Default for InstallSection {
    fn default() -> Self {
        Self {
            mc_version: String::new(),
            loader_version: String::new(),
            installer_url: String::new(),
            installer_arguments: vec!["--installServer".to_string()],
            modpack_url: String::new(),
            modpack_format: "curse".to_string(),
            format_specific: FormatSpecific::default(),
            base_install_path: ".".to_string(),
            ignore_files: Vec::new(),
            additional_files: Vec::new(),
            local_files: Vec::new(),
            install_loader: true,
            sponge_bootstrapper: String::new(),
            connect_timeout: 30,
            read_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatSpecific {
    /// Curse project ids that are never downloaded (client-only mods).
    pub ignore_project: Vec<u64>,
    /// Template with `{projectId}` and `{fileId}` placeholders.
    pub mod_download_url: String,
}

impl Default for FormatSpecific {
    fn default() -> Self {
        Self {
            ignore_project: Vec::new(),
            mod_download_url: DEFAULT_MOD_DOWNLOAD_URL.to_string(),
        }
    }
}

/// A remote file installed after the pack content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalFile {
    pub url: String,
    pub destination: String,
    pub sha1: Option<String>,
}

/// A file copied from the working directory into the install.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalFile {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchSection {
    pub spongefix: bool,
    pub check_offline: bool,
    pub connectivity_urls: Vec<String>,
    pub max_ram: String,
    pub min_ram: String,
    pub java_args: Vec<String>,
    pub pre_java_args: String,
    pub forced_java_path: String,
    pub start_file: String,
    pub auto_restart: bool,
    pub max_restarts: u32,
    /// Seconds after which the crash counter resets.
    pub restarts_reset_time: u64,
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            spongefix: false,
            check_offline: true,
            connectivity_urls: vec![
                "https://www.google.com".to_string(),
                "https://1.1.1.1".to_string(),
            ],
            max_ram: "4G".to_string(),
            min_ram: String::new(),
            java_args: Vec::new(),
            pre_java_args: String::new(),
            forced_java_path: String::new(),
            start_file: String::new(),
            auto_restart: false,
            max_restarts: 10,
            restarts_reset_time: 3600,
        }
    }
}

impl ConfigFile {
    /// Trim user input and fill in empty values that have a sane default.
    pub fn normalize(mut self) -> Self {
        let install = &mut self.install;
        install.mc_version = install.mc_version.trim().to_string();
        install.loader_version = install.loader_version.trim().to_string();
        install.installer_url = install.installer_url.trim().to_string();
        install.modpack_url = install.modpack_url.trim().to_string();
        install.modpack_format = install.modpack_format.trim().to_string();
        install.sponge_bootstrapper = install.sponge_bootstrapper.trim().to_string();

        install.base_install_path = install.base_install_path.trim().to_string();
        if install.base_install_path.is_empty() {
            install.base_install_path = ".".to_string();
        }

        install.ignore_files = install
            .ignore_files
            .iter()
            .map(|f| f.trim().replace('\\', "/"))
            .filter(|f| !f.is_empty())
            .collect();

        if install.format_specific.mod_download_url.trim().is_empty() {
            install.format_specific.mod_download_url = DEFAULT_MOD_DOWNLOAD_URL.to_string();
        }

        let launch = &mut self.launch;
        launch.max_ram = launch.max_ram.trim().to_string();
        launch.min_ram = launch.min_ram.trim().to_string();
        launch.forced_java_path = launch.forced_java_path.trim().to_string();
        launch.start_file = launch.start_file.trim().to_string();
        launch.java_args.retain(|a| !a.trim().is_empty());

        self
    }

    /// Reject configurations the orchestrator cannot act on.
    pub fn validate(&self) -> StarterResult<()> {
        if self.install.modpack_url.is_empty() {
            return Err(StarterError::Config(
                "install.modpackUrl must not be empty".into(),
            ));
        }

        self.pack_format()?;

        if self.launch.spongefix && self.install.sponge_bootstrapper.is_empty() {
            return Err(StarterError::Config(
                "launch.spongefix requires install.spongeBootstrapper".into(),
            ));
        }

        for (key, value) in [
            ("launch.maxRam", &self.launch.max_ram),
            ("launch.minRam", &self.launch.min_ram),
        ] {
            if !value.is_empty() && !is_memory_size(value) {
                return Err(StarterError::Config(format!(
                    "{} has an invalid memory size: {:?}",
                    key, value
                )));
            }
        }

        for file in &self.install.additional_files {
            if file.url.trim().is_empty() || file.destination.trim().is_empty() {
                return Err(StarterError::Config(
                    "install.additionalFiles entries need url and destination".into(),
                ));
            }
        }

        for file in &self.install.local_files {
            if file.from.trim().is_empty() || file.to.trim().is_empty() {
                return Err(StarterError::Config(
                    "install.localFiles entries need from and to".into(),
                ));
            }
        }

        Ok(())
    }

    pub fn pack_format(&self) -> StarterResult<PackFormat> {
        self.install.modpack_format.parse()
    }

    /// Install root resolved against the working directory.
    pub fn base_path(&self, working_dir: &Path) -> PathBuf {
        let base = Path::new(&self.install.base_install_path);
        if base.is_absolute() {
            base.to_path_buf()
        } else {
            working_dir.join(base)
        }
    }

    pub fn pack_name(&self) -> &str {
        if self.modpack.name.is_empty() {
            "an unnamed modpack"
        } else {
            &self.modpack.name
        }
    }
}

fn is_memory_size(value: &str) -> bool {
    let Some(last) = value.chars().last() else {
        return false;
    };
    let digits = if last.is_ascii_digit() {
        value
    } else if matches!(last, 'k' | 'K' | 'm' | 'M' | 'g' | 'G') {
        &value[..value.len() - 1]
    } else {
        return false;
    };

    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
