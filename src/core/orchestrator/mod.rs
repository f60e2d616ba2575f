// ─── Orchestrator ───
// Connectivity gate, install decision, step sequence, launch gate.
//
// Every step is awaited before the next begins and each durable step is
// committed to the lock record before the sequence moves on.

pub mod steps;

use chrono::Utc;
use tracing::{info, warn};

use crate::core::config::ConfigFile;
use crate::core::connectivity::ConnectivityProbe;
use crate::core::error::{StarterError, StarterResult};
use crate::core::launch::ServerRunner;
use crate::core::lock::{LockFile, LockStore};

pub use steps::{InstallSteps, LiveSteps};

/// What the user asked for on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Install when due, then exit.
    InstallOnly,
    /// Install when due, then start the server.
    InstallAndLaunch,
}

/// What happens once the install decision has been acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Exit,
    Launch,
}

impl NextAction {
    /// Install-only runs always exit, everything else launches whether or
    /// not an install just happened.
    pub fn decide(install_only: bool, _install_performed: bool) -> Self {
        if install_only {
            NextAction::Exit
        } else {
            NextAction::Launch
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub install_performed: bool,
    pub action: NextAction,
}

pub struct Orchestrator<'a> {
    config: &'a ConfigFile,
    store: &'a LockStore,
    probe: &'a dyn ConnectivityProbe,
    steps: &'a dyn InstallSteps,
    runner: &'a dyn ServerRunner,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a ConfigFile,
        store: &'a LockStore,
        probe: &'a dyn ConnectivityProbe,
        steps: &'a dyn InstallSteps,
        runner: &'a dyn ServerRunner,
    ) -> Self {
        Self {
            config,
            store,
            probe,
            steps,
            runner,
        }
    }

    pub async fn run(&self, lock: &mut LockFile, mode: RunMode) -> StarterResult<RunOutcome> {
        if self.config.launch.check_offline {
            self.check_connectivity().await?;
        }

        let install_performed = lock.should_install(self.config);
        if install_performed {
            info!(
                "Installing {} from {}",
                self.config.pack_name(),
                self.config.install.modpack_url
            );
            self.install(lock).await?;
            info!("Install finished");
        } else {
            info!("{} is already installed", self.config.pack_name());
        }

        let action = NextAction::decide(mode == RunMode::InstallOnly, install_performed);
        match action {
            NextAction::Exit => info!("Install only, not starting the server"),
            NextAction::Launch => self.runner.run_server(self.config, lock).await?,
        }

        Ok(RunOutcome {
            install_performed,
            action,
        })
    }

    async fn check_connectivity(&self) -> StarterResult<()> {
        if self.probe.is_reachable().await {
            return Ok(());
        }
        warn!("None of the connectivity targets answered");
        Err(StarterError::Connectivity {
            probed: self.probe.targets(),
        })
    }

    async fn install(&self, lock: &mut LockFile) -> StarterResult<()> {
        let config = self.config;

        // Markers of a previous install describe content about to be replaced.
        *lock = LockFile::default();

        let pack = self.steps.fetch_pack(config).await?;
        lock.pack_installed = true;
        lock.pack_url = config.install.modpack_url.clone();
        lock.installed_at = Some(Utc::now());
        self.store.save(lock).await?;

        if config.install.install_loader {
            let forge = self.steps.install_loader(config, &pack).await?;
            lock.loader_installed = true;
            lock.mc_version = Some(forge.mc_version);
            lock.loader_version = Some(forge.forge_version);
            self.store.save(lock).await?;
        }

        if config.launch.spongefix {
            let bootstrap = self.steps.install_bootstrap(config).await?;
            lock.bootstrap_applied = true;
            lock.bootstrap_path = Some(bootstrap);
            self.store.save(lock).await?;
        }

        self.steps.install_additional_files(config).await?;
        self.steps.install_local_files(config).await?;

        Ok(())
    }
}
