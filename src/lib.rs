pub mod cli;
pub mod core;

use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::error;

use crate::cli::Cli;
use crate::core::config::load_config;
use crate::core::connectivity::HttpProbe;
use crate::core::downloader::Downloader;
use crate::core::error::{StarterError, StarterResult};
use crate::core::http::build_http_client;
use crate::core::launch::ProcessRunner;
use crate::core::lock::LockStore;
use crate::core::logging::{self, LOG_FILE_NAME};
use crate::core::orchestrator::{LiveSteps, Orchestrator, RunOutcome};

/// Entry point of the binary. Every error ends here and becomes a failing
/// exit code.
pub async fn run(mut cli: Cli) -> ExitCode {
    // Child processes run inside the install root, so every path handed to
    // them must not depend on our own current directory.
    cli.dir = match resolve_working_dir(&cli.dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("serverstarter: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&cli.dir.join(LOG_FILE_NAME)) {
        eprintln!("serverstarter: {}", e);
        return ExitCode::FAILURE;
    }

    match execute(&cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = %e.kind(), "Some uncaught error happened. {}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: &Cli) -> StarterResult<RunOutcome> {
    let working_dir = cli.dir.as_path();

    let config = load_config(&cli.config_path()).await?;
    logging::banner(&config);

    let store = LockStore::in_dir(working_dir);
    let mut lock = store.load().await?;

    let base_path = config.base_path(working_dir);
    let client = build_http_client(&config.install)?;
    let downloader = Downloader::new(client, working_dir.to_path_buf());

    let probe = HttpProbe::new(
        downloader.client().clone(),
        config.launch.connectivity_urls.clone(),
    );
    let steps = LiveSteps::new(&downloader, working_dir, base_path.clone());
    let runner = ProcessRunner::new(base_path);

    Orchestrator::new(&config, &store, &probe, &steps, &runner)
        .run(&mut lock, cli.run_mode())
        .await
}

fn resolve_working_dir(dir: &Path) -> StarterResult<PathBuf> {
    std::path::absolute(dir).map_err(|e| StarterError::io(dir, e))
}

/// `outer: inner: innermost` rendering of an error and its sources.
fn error_chain(err: &StarterError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !rendered.contains(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }
    rendered
}
