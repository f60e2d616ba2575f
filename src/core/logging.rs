// ─── Logging ───
// Console output plus an appended plain-text copy in the working directory.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::ConfigFile;
use crate::core::error::{StarterError, StarterResult};

pub const LOG_FILE_NAME: &str = "serverstarter.log";
const DEFAULT_FILTER: &str = "info,serverstarter_lib=debug,serverstarter=debug";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(log_path: &Path) -> StarterResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| StarterError::io(log_path, e))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| StarterError::Other(format!("Logging already initialized: {}", e)))
}

pub fn banner(config: &ConfigFile) {
    info!("::::::::::::::::::::::::::::::::::::::::::::::::::::");
    info!("   Minecraft Forge Server install/launcher jar");
    info!("   serverstarter {}", env!("CARGO_PKG_VERSION"));
    info!("::::::::::::::::::::::::::::::::::::::::::::::::::::");
    info!("You are playing {}", config.pack_name());
    info!("Starting to install/launch the server, lean back!");
}
