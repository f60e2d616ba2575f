use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::CONFIG_FILE_NAME;
use crate::core::orchestrator::RunMode;

/// Installs a modded Forge server from `server-setup-config.yaml` and
/// launches it.
#[derive(Debug, Parser)]
#[command(name = "serverstarter")]
#[command(version)]
pub struct Cli {
    /// Config file, relative paths resolve against the working directory
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Working directory holding the lock and log files
    #[arg(short = 'C', long = "dir", default_value = ".")]
    pub dir: PathBuf,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Mode {
    /// Install or update the server, then exit
    Install,
    /// Install when needed, then start the server (default)
    Launch,
}

impl Cli {
    pub fn run_mode(&self) -> RunMode {
        match self.mode {
            Some(Mode::Install) => RunMode::InstallOnly,
            Some(Mode::Launch) | None => RunMode::InstallAndLaunch,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        if self.config.is_absolute() {
            self.config.clone()
        } else {
            self.dir.join(&self.config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_launch_from_current_dir() {
        let cli = Cli::parse_from(["serverstarter"]);
        assert_eq!(cli.run_mode(), RunMode::InstallAndLaunch);
        assert_eq!(cli.config_path(), PathBuf::from(".").join(CONFIG_FILE_NAME));
    }

    #[test]
    fn install_subcommand_and_dir() {
        let cli = Cli::parse_from(["serverstarter", "-C", "/srv/mc", "--config", "custom.yaml", "install"]);
        assert_eq!(cli.run_mode(), RunMode::InstallOnly);
        assert_eq!(cli.config_path(), PathBuf::from("/srv/mc/custom.yaml"));
    }
}
