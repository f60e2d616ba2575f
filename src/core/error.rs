use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the installer and launcher.
/// Every module returns `Result<T, StarterError>`.
#[derive(Debug, Error)]
pub enum StarterError {
    // ── Configuration ───────────────────────────────────
    #[error("No config file found at {path:?}")]
    ConfigMissing { path: PathBuf },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Unknown pack format given in config: {0}")]
    UnknownPackFormat(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ── Connectivity ────────────────────────────────────
    #[error("Problems with the Internet connection, none of {probed} probe targets answered")]
    Connectivity { probed: usize },

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Pack ────────────────────────────────────────────
    #[error("Modpack error: {0}")]
    Pack(String),

    // ── Loader ──────────────────────────────────────────
    #[error("Loader error: {0}")]
    Loader(String),

    // ── Java ────────────────────────────────────────────
    #[error("No usable Java binary found (tried {0})")]
    JavaNotFound(String),

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    // ── Server ──────────────────────────────────────────
    #[error("Server error: {0}")]
    Server(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type StarterResult<T> = Result<T, StarterError>;

/// Coarse classification used for the final log line of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing was mutated; fix the config and re-run.
    Configuration,
    /// Nothing was mutated; re-run once the network is back.
    Connectivity,
    /// An install step failed; completed steps stay recorded.
    Step,
    /// The server process could not be run.
    Runtime,
}

impl StarterError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StarterError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StarterError::ConfigMissing { .. }
            | StarterError::Config(_)
            | StarterError::UnknownPackFormat(_)
            | StarterError::Yaml(_) => ErrorKind::Configuration,
            StarterError::Connectivity { .. } => ErrorKind::Connectivity,
            StarterError::Server(_) => ErrorKind::Runtime,
            _ => ErrorKind::Step,
        }
    }
}

impl From<std::io::Error> for StarterError {
    fn from(source: std::io::Error) -> Self {
        StarterError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Connectivity => write!(f, "connectivity"),
            ErrorKind::Step => write!(f, "install step"),
            ErrorKind::Runtime => write!(f, "server runtime"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_classified_as_configuration() {
        let err = StarterError::UnknownPackFormat("modrinth".into());
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            StarterError::ConfigMissing {
                path: PathBuf::from("server-setup-config.yaml")
            }
            .kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn io_errors_are_step_errors() {
        let err = StarterError::io(
            "mods",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert_eq!(err.kind(), ErrorKind::Step);
        assert!(err.to_string().contains("mods"));
    }

    #[test]
    fn connectivity_error_is_its_own_kind() {
        assert_eq!(
            StarterError::Connectivity { probed: 2 }.kind(),
            ErrorKind::Connectivity
        );
    }
}
