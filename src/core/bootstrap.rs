// ─── Bootstrap Patch ───
// Installs the SpongeForge bootstrapper jar used to start the server when
// `launch.spongefix` is on.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::downloader::Downloader;
use crate::core::error::{StarterError, StarterResult};

const DEFAULT_BOOTSTRAP_NAME: &str = "SpongeBootstrap.jar";

/// Download the bootstrapper into the install root and return its path.
pub async fn install_sponge_bootstrapper(
    downloader: &Downloader,
    url: &str,
    base_path: &Path,
) -> StarterResult<PathBuf> {
    if url.is_empty() {
        return Err(StarterError::Config(
            "No sponge bootstrapper url configured".into(),
        ));
    }

    let dest = base_path.join(bootstrap_file_name(url));
    info!("Installing sponge bootstrapper from {} to {:?}", url, dest);
    downloader.download_file(url, &dest, None).await?;

    Ok(dest)
}

fn bootstrap_file_name(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|u| u.rsplit(['/', '\\']).next())
        .filter(|name| name.ends_with(".jar"))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_BOOTSTRAP_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_url() {
        assert_eq!(
            bootstrap_file_name("https://example.com/dl/SpongeBootstrap-0.7.1.jar?raw=1"),
            "SpongeBootstrap-0.7.1.jar"
        );
        assert_eq!(
            bootstrap_file_name("https://example.com/latest"),
            DEFAULT_BOOTSTRAP_NAME
        );
    }

    #[tokio::test]
    async fn installs_local_bootstrapper() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SpongeBootstrap-0.7.1.jar"), b"jar").unwrap();
        let downloader = Downloader::new(reqwest::Client::new(), dir.path().to_path_buf());
        let base = dir.path().join("server");

        let path = install_sponge_bootstrapper(&downloader, "SpongeBootstrap-0.7.1.jar", &base)
            .await
            .unwrap();

        assert_eq!(path, base.join("SpongeBootstrap-0.7.1.jar"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(reqwest::Client::new(), dir.path().to_path_buf());
        assert!(install_sponge_bootstrapper(&downloader, "", dir.path())
            .await
            .is_err());
    }
}
