pub mod model;

pub use model::{
    AdditionalFile, ConfigFile, FormatSpecific, InstallSection, LaunchSection, LocalFile,
    ModpackSection, PackFormat,
};

use std::path::Path;

use tracing::debug;

use crate::core::error::{StarterError, StarterResult};

pub const CONFIG_FILE_NAME: &str = "server-setup-config.yaml";

/// Read, normalize and validate the desired state.
///
/// A missing file is fatal: there is nothing to install without it.
pub async fn load_config(path: &Path) -> StarterResult<ConfigFile> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StarterError::ConfigMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(StarterError::io(path, e)),
    };

    let config: ConfigFile = serde_yaml::from_str(&raw)?;
    let config = config.normalize();
    config.validate()?;

    debug!("Loaded config from {:?}: {:?}", path, config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap_err();
        assert!(matches!(err, StarterError::ConfigMissing { .. }));
    }

    #[tokio::test]
    async fn malformed_yaml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "install: [unclosed").unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(matches!(err, StarterError::Yaml(_)));
    }

    #[tokio::test]
    async fn loads_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "install:\n  modpackUrl: https://example.com/pack.zip\n  modpackFormat: zip\n",
        )
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.pack_format().unwrap(), PackFormat::Zip);
    }
}
