use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::core::error::{StarterError, StarterResult};

/// A Java binary whose `-version` banner could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaInstallation {
    pub path: PathBuf,
    pub version: String,
    pub major: u32,
    pub vendor: Option<String>,
}

/// Pick the Java binary used for the Forge installer and the server.
///
/// Order: `forcedJavaPath`, `$JAVA_HOME/bin/java`, `java` from `PATH`.
pub fn resolve_java_binary(forced_path: &str) -> StarterResult<PathBuf> {
    if !forced_path.is_empty() {
        let forced = PathBuf::from(forced_path);
        if forced.is_file() {
            // The server runs inside the install root, not our directory.
            return std::path::absolute(&forced).map_err(|e| StarterError::io(&forced, e));
        }
        return Err(StarterError::JavaNotFound(format!(
            "forcedJavaPath {:?}",
            forced_path
        )));
    }

    let mut tried = Vec::new();

    if let Some(home) = std::env::var_os("JAVA_HOME") {
        let candidate = PathBuf::from(home).join("bin").join(java_exe());
        if candidate.is_file() {
            debug!("Using Java from JAVA_HOME: {:?}", candidate);
            return Ok(candidate);
        }
        tried.push(candidate.display().to_string());
    }

    if let Some(path_var) = std::env::var_os("PATH") {
        if let Some(found) = find_on_path(&path_var) {
            debug!("Using Java from PATH: {:?}", found);
            return Ok(found);
        }
    }
    tried.push(format!("{} on PATH", java_exe()));

    Err(StarterError::JavaNotFound(tried.join(", ")))
}

/// First `java` executable in a `PATH`-style list.
pub fn find_on_path(path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(java_exe()))
        .find(|candidate| candidate.is_file())
}

/// Warn when the Java found is older than the Minecraft version needs.
///
/// Only a warning: Forge's own installer gives the definitive error.
pub fn check_java_for_minecraft(java_bin: &Path, minecraft_version: &str) {
    let required = required_java_for_minecraft_version(minecraft_version);
    match probe_java(java_bin) {
        Some(java) if java.major < required => warn!(
            "Java {} at {:?} is older than Java {} required by Minecraft {}",
            java.version, java.path, required, minecraft_version
        ),
        Some(java) => info!(
            "Using Java {} ({}) at {:?}",
            java.version,
            java.vendor.as_deref().unwrap_or("unknown vendor"),
            java.path
        ),
        None => warn!("Could not determine the version of {:?}", java_bin),
    }
}

/// Minimum Java major for a Minecraft release (or weekly snapshot).
pub fn required_java_for_minecraft_version(minecraft_version: &str) -> u32 {
    // Snapshots look like `24w14a`: year before the `w`.
    if let Some((year, _)) = minecraft_version.to_ascii_lowercase().split_once('w') {
        if let Ok(year) = year.parse::<u32>() {
            return if year >= 24 { 21 } else { 17 };
        }
    }

    let numbers: Vec<u32> = minecraft_version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect();
    let major = numbers.first().copied().unwrap_or(1);
    let minor = numbers.get(1).copied().unwrap_or(0);
    let patch = numbers.get(2).copied().unwrap_or(0);

    match (major, minor, patch) {
        (m, _, _) if m > 1 => 21,
        (_, minor, _) if minor >= 21 => 21,
        (_, 20, patch) if patch >= 5 => 21,
        (_, minor, _) if minor >= 17 => 17,
        _ => 8,
    }
}

#[instrument]
fn probe_java(path: &Path) -> Option<JavaInstallation> {
    let output = std::process::Command::new(path)
        .arg("-version")
        .output()
        .ok()?;

    // `java -version` prints its banner on stderr.
    let banner = String::from_utf8_lossy(&output.stderr);
    parse_version_banner(path, &banner)
}

fn parse_version_banner(path: &Path, banner: &str) -> Option<JavaInstallation> {
    let version_line = banner.lines().find(|l| l.contains(" version "))?;
    let version = version_line.split('"').nth(1)?.to_string();
    let major = java_major(&version);

    let vendor = ["Temurin", "Zulu", "GraalVM", "Corretto", "OpenJDK"]
        .into_iter()
        .find(|name| banner.contains(name))
        .map(str::to_string);

    Some(JavaInstallation {
        path: path.to_path_buf(),
        version,
        major,
        vendor,
    })
}

/// `1.8.0_392` is Java 8, `17.0.9` is Java 17.
fn java_major(version: &str) -> u32 {
    let mut parts = version.split(|c: char| !c.is_ascii_digit());
    match parts.next().and_then(|p| p.parse().ok()) {
        Some(1) => parts.next().and_then(|p| p.parse().ok()).unwrap_or(1),
        Some(major) => major,
        None => 0,
    }
}

fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}
