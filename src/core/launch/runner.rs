use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::core::config::ConfigFile;
use crate::core::error::{StarterError, StarterResult};
use crate::core::java::{check_java_for_minecraft, resolve_java_binary};
use crate::core::launch::command::ServerCommand;
use crate::core::lock::LockFile;

/// Starts the installed server and keeps it in the foreground.
#[async_trait]
pub trait ServerRunner: Send + Sync {
    async fn run_server(&self, config: &ConfigFile, lock: &LockFile) -> StarterResult<()>;
}

/// Runs the server as a child process of this one.
pub struct ProcessRunner {
    base_path: PathBuf,
}

impl ProcessRunner {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

#[async_trait]
impl ServerRunner for ProcessRunner {
    async fn run_server(&self, config: &ConfigFile, lock: &LockFile) -> StarterResult<()> {
        let java_bin = resolve_java_binary(&config.launch.forced_java_path)?;
        if let Some(mc) = lock.mc_version.as_deref() {
            check_java_for_minecraft(&java_bin, mc);
        }

        let command = ServerCommand::build(config, lock, java_bin, &self.base_path)?;
        let mut restarts = RestartPolicy::new(
            config.launch.max_restarts,
            Duration::from_secs(config.launch.restarts_reset_time),
        );

        loop {
            let status = run_once(&command, &self.base_path).await?;
            if status.success() {
                info!("Server stopped");
                return Ok(());
            }

            if !config.launch.auto_restart {
                return Err(StarterError::Server(format!(
                    "Server exited with code {:?}",
                    status.code()
                )));
            }

            if !restarts.record_crash(Instant::now()) {
                error!(
                    "Server crashed more than {} times within {}s, giving up",
                    config.launch.max_restarts, config.launch.restarts_reset_time
                );
                return Err(StarterError::Server(format!(
                    "Server keeps crashing (last exit code {:?})",
                    status.code()
                )));
            }

            warn!(
                "Server crashed with code {:?}, restarting ({} recent crashes)",
                status.code(),
                restarts.recent_crashes()
            );
        }
    }
}

async fn run_once(command: &ServerCommand, base_path: &Path) -> StarterResult<ExitStatus> {
    info!("Starting server in {:?}", base_path);
    info!("Launch command: {}", command.display());

    let mut child = command
        .to_command()
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| StarterError::JavaExecution(format!("Failed to start server: {}", e)))?;

    info!("Server running (PID {:?})", child.id());

    let stdout_task = child.stdout.take().map(|stdout| {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                println!("{}", line);
            }
        })
    });

    let stderr_task = child.stderr.take().map(|stderr| {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                eprintln!("{}", line);
            }
        })
    });

    let status = child
        .wait()
        .await
        .map_err(|e| StarterError::Server(format!("Failed to wait for server: {}", e)))?;

    // Drain whatever the server printed before it exited.
    for task in [stdout_task, stderr_task].into_iter().flatten() {
        let _ = task.await;
    }

    Ok(status)
}

// ─── Restart policy ───

/// Counts crashes inside a sliding window of `reset_after`.
#[derive(Debug)]
pub struct RestartPolicy {
    max_restarts: u32,
    reset_after: Duration,
    crashes: Vec<Instant>,
}

impl RestartPolicy {
    pub fn new(max_restarts: u32, reset_after: Duration) -> Self {
        Self {
            max_restarts,
            reset_after,
            crashes: Vec::new(),
        }
    }

    /// Record a crash at `now`; false once the window holds too many.
    pub fn record_crash(&mut self, now: Instant) -> bool {
        let window = self.reset_after;
        self.crashes
            .retain(|crash| now.saturating_duration_since(*crash) < window);
        self.crashes.push(now);
        self.crashes.len() as u32 <= self.max_restarts
    }

    pub fn recent_crashes(&self) -> usize {
        self.crashes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_max_restarts_in_window() {
        let start = Instant::now();
        let mut policy = RestartPolicy::new(2, Duration::from_secs(60));

        assert!(policy.record_crash(start));
        assert!(policy.record_crash(start + Duration::from_secs(1)));
        assert!(!policy.record_crash(start + Duration::from_secs(2)));
    }

    #[test]
    fn old_crashes_fall_out_of_the_window() {
        let start = Instant::now();
        let mut policy = RestartPolicy::new(1, Duration::from_secs(10));

        assert!(policy.record_crash(start));
        assert!(policy.record_crash(start + Duration::from_secs(11)));
        assert_eq!(policy.recent_crashes(), 1);
    }

    #[test]
    fn zero_max_restarts_never_restarts() {
        let mut policy = RestartPolicy::new(0, Duration::from_secs(10));
        assert!(!policy.record_crash(Instant::now()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_once_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let command = ServerCommand {
            program: PathBuf::from("sh"),
            args: vec!["-c".into(), "echo started; exit 3".into()],
            working_dir: dir.path().to_path_buf(),
        };

        let status = run_once(&command, dir.path()).await.unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
