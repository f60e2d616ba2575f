// ─── Server Command ───
// Assembles the java invocation that starts the installed server.

use std::path::{Path, PathBuf};

use crate::core::config::ConfigFile;
use crate::core::error::{StarterError, StarterResult};
use crate::core::loaders::{detect_server_entry, ServerEntry};
use crate::core::lock::LockFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl ServerCommand {
    pub fn build(
        config: &ConfigFile,
        lock: &LockFile,
        java_bin: PathBuf,
        base_path: &Path,
    ) -> StarterResult<Self> {
        let base_path =
            std::path::absolute(base_path).map_err(|e| StarterError::io(base_path, e))?;
        let entry = resolve_entry(config, lock, &base_path)?;
        let launch = &config.launch;

        let mut args: Vec<String> = launch
            .pre_java_args
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if !launch.max_ram.is_empty() {
            args.push(format!("-Xmx{}", launch.max_ram));
        }
        if !launch.min_ram.is_empty() {
            args.push(format!("-Xms{}", launch.min_ram));
        }
        args.extend(launch.java_args.iter().cloned());

        match entry {
            ServerEntry::Jar(jar) => {
                args.push("-jar".to_string());
                args.push(jar.to_string_lossy().to_string());
            }
            ServerEntry::ArgsFile(file) => {
                args.push(format!("@{}", file.to_string_lossy()));
            }
        }
        args.push("nogui".to_string());

        Ok(Self {
            program: java_bin,
            args,
            working_dir: base_path,
        })
    }

    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.working_dir);
        cmd
    }

    /// Copy/paste friendly rendering for the logs.
    pub fn display(&self) -> String {
        let program = shell_escape(&self.program.to_string_lossy());
        let args = self
            .args
            .iter()
            .map(|arg| shell_escape(arg))
            .collect::<Vec<_>>()
            .join(" ");

        if args.is_empty() {
            program
        } else {
            format!("{} {}", program, args)
        }
    }
}

fn resolve_entry(
    config: &ConfigFile,
    lock: &LockFile,
    base_path: &Path,
) -> StarterResult<ServerEntry> {
    if !config.launch.start_file.is_empty() {
        let jar = base_path.join(&config.launch.start_file);
        if !jar.is_file() {
            return Err(StarterError::Server(format!(
                "Configured startFile {:?} does not exist",
                jar
            )));
        }
        return Ok(ServerEntry::Jar(jar));
    }

    if config.launch.spongefix && lock.bootstrap_applied {
        if let Some(bootstrap) = lock.bootstrap_path.as_ref().filter(|p| p.is_file()) {
            let bootstrap =
                std::path::absolute(bootstrap).map_err(|e| StarterError::io(bootstrap, e))?;
            return Ok(ServerEntry::Jar(bootstrap));
        }
    }

    let mc_version = lock
        .mc_version
        .as_deref()
        .or_else(|| non_empty(&config.install.mc_version));
    let loader_version = lock
        .loader_version
        .as_deref()
        .or_else(|| non_empty(&config.install.loader_version));

    detect_server_entry(base_path, mc_version, loader_version).ok_or_else(|| {
        StarterError::Server(format!(
            "No Forge server found in {:?}, delete {} to force a reinstall",
            base_path,
            crate::core::lock::LOCK_FILE_NAME
        ))
    })
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=' | '@' | '+')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConfigFile {
        let mut config = ConfigFile::default();
        config.install.modpack_url = "pack.zip".into();
        config.launch.max_ram = "6G".into();
        config.launch.min_ram = "2G".into();
        config.launch.java_args = vec!["-XX:+UseG1GC".into()];
        config.launch.pre_java_args = "-Dlog4j2.formatMsgNoLookups=true".into();
        config
    }

    #[test]
    fn legacy_jar_command() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("forge-1.12.2-14.23.5.2847.jar");
        std::fs::write(&jar, b"").unwrap();
        let lock = LockFile {
            mc_version: Some("1.12.2".into()),
            loader_version: Some("14.23.5.2847".into()),
            ..Default::default()
        };

        let cmd = ServerCommand::build(&config(), &lock, PathBuf::from("java"), dir.path()).unwrap();

        assert_eq!(
            cmd.args,
            vec![
                "-Dlog4j2.formatMsgNoLookups=true".to_string(),
                "-Xmx6G".to_string(),
                "-Xms2G".to_string(),
                "-XX:+UseG1GC".to_string(),
                "-jar".to_string(),
                jar.to_string_lossy().to_string(),
                "nogui".to_string(),
            ]
        );
        assert_eq!(cmd.working_dir, dir.path());
    }

    #[test]
    fn relative_base_path_resolves_from_the_child_working_dir() {
        let dir = tempfile::tempdir_in(".").unwrap();
        assert!(dir.path().is_relative());
        let base = dir.path().join("setup");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("forge-1.12.2-14.23.5.2847.jar"), b"").unwrap();
        let lock = LockFile {
            mc_version: Some("1.12.2".into()),
            loader_version: Some("14.23.5.2847".into()),
            ..Default::default()
        };

        let cmd = ServerCommand::build(&config(), &lock, PathBuf::from("java"), &base).unwrap();

        let jar = &cmd.args[cmd.args.len() - 2];
        assert!(cmd.working_dir.is_absolute());
        assert!(cmd.working_dir.join(jar).is_file());
    }

    #[test]
    fn versions_fall_back_to_config_when_lock_has_none() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("forge-1.16.5-36.2.39.jar");
        std::fs::write(&jar, b"").unwrap();
        let mut config = config();
        config.install.mc_version = "1.16.5".into();
        config.install.loader_version = "36.2.39".into();

        let cmd = ServerCommand::build(
            &config,
            &LockFile::default(),
            PathBuf::from("java"),
            dir.path(),
        )
        .unwrap();
        assert!(cmd.args.contains(&jar.to_string_lossy().to_string()));
    }

    #[test]
    fn sponge_bootstrap_replaces_forge_jar() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("forge-1.12.2-14.23.5.2847.jar"), b"").unwrap();
        let bootstrap = dir.path().join("SpongeBootstrap.jar");
        std::fs::write(&bootstrap, b"").unwrap();

        let mut config = config();
        config.launch.spongefix = true;
        let lock = LockFile {
            mc_version: Some("1.12.2".into()),
            loader_version: Some("14.23.5.2847".into()),
            bootstrap_applied: true,
            bootstrap_path: Some(bootstrap.clone()),
            ..Default::default()
        };

        let cmd = ServerCommand::build(&config, &lock, PathBuf::from("java"), dir.path()).unwrap();
        assert!(cmd.args.contains(&bootstrap.to_string_lossy().to_string()));
    }

    #[test]
    fn args_file_is_passed_with_at_sign() {
        let dir = tempfile::tempdir().unwrap();
        let args_name = if cfg!(windows) { "win_args.txt" } else { "unix_args.txt" };
        let version_dir = dir
            .path()
            .join("libraries/net/minecraftforge/forge/1.20.1-47.2.0");
        std::fs::create_dir_all(&version_dir).unwrap();
        std::fs::write(version_dir.join(args_name), "").unwrap();
        let lock = LockFile {
            mc_version: Some("1.20.1".into()),
            loader_version: Some("47.2.0".into()),
            ..Default::default()
        };

        let cmd = ServerCommand::build(&config(), &lock, PathBuf::from("java"), dir.path()).unwrap();
        assert_eq!(
            cmd.args[cmd.args.len() - 2],
            format!("@{}", version_dir.join(args_name).to_string_lossy())
        );
        assert_eq!(cmd.args.last().map(String::as_str), Some("nogui"));
    }

    #[test]
    fn missing_server_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerCommand::build(
            &config(),
            &LockFile::default(),
            PathBuf::from("java"),
            dir.path(),
        )
        .unwrap_err();
        match err {
            StarterError::Server(message) => {
                assert!(message.contains(crate::core::lock::LOCK_FILE_NAME))
            }
            other => panic!("expected a server error, got {:?}", other),
        }
    }

    #[test]
    fn display_quotes_spaces() {
        let cmd = ServerCommand {
            program: PathBuf::from("/opt/java 17/bin/java"),
            args: vec!["-Xmx4G".into(), "nogui".into()],
            working_dir: PathBuf::from("."),
        };
        assert_eq!(cmd.display(), "\"/opt/java 17/bin/java\" -Xmx4G nogui");
    }
}
