// ─── File Manager ───
// Extra files declared in the config, installed after the pack content.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::config::{AdditionalFile, LocalFile};
use crate::core::downloader::{DownloadEntry, Downloader};
use crate::core::error::{StarterError, StarterResult};

pub struct FileManager<'a> {
    downloader: &'a Downloader,
    working_dir: &'a Path,
    base_path: &'a Path,
}

impl<'a> FileManager<'a> {
    pub fn new(downloader: &'a Downloader, working_dir: &'a Path, base_path: &'a Path) -> Self {
        Self {
            downloader,
            working_dir,
            base_path,
        }
    }

    /// Download every `additionalFiles` entry into the install root.
    pub async fn install_additional_files(&self, files: &[AdditionalFile]) -> StarterResult<()> {
        if files.is_empty() {
            return Ok(());
        }
        info!("Installing {} additional files", files.len());

        let entries = files
            .iter()
            .map(|f| DownloadEntry {
                url: f.url.clone(),
                dest: self.base_path.join(&f.destination),
                sha1: f.sha1.clone().filter(|s| !s.trim().is_empty()),
            })
            .collect();

        let failures = self.downloader.download_batch(entries).await;
        if let Some((entry, err)) = failures.into_iter().next() {
            return Err(StarterError::Other(format!(
                "Additional file {} failed: {}",
                entry.url, err
            )));
        }

        Ok(())
    }

    /// Copy every `localFiles` entry into the install root.
    ///
    /// Runs after the additional files, so a local file replaces a
    /// downloaded one with the same destination.
    pub async fn install_local_files(&self, files: &[LocalFile]) -> StarterResult<()> {
        if files.is_empty() {
            return Ok(());
        }
        info!("Installing {} local files", files.len());

        for file in files {
            let from = self.resolve_source(&file.from);
            let to = self.base_path.join(&file.to);

            let metadata = tokio::fs::metadata(&from)
                .await
                .map_err(|e| StarterError::io(&from, e))?;

            if metadata.is_dir() {
                let (from, to) = (from.clone(), to.clone());
                tokio::task::spawn_blocking(move || copy_dir_recursive(&from, &to))
                    .await
                    .map_err(|e| StarterError::Other(e.to_string()))?
                    .map_err(|e| StarterError::io(&file.from, e))?;
            } else {
                if let Some(parent) = to.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| StarterError::io(parent, e))?;
                }
                tokio::fs::copy(&from, &to)
                    .await
                    .map_err(|e| StarterError::io(&from, e))?;
            }

            info!("Copied {:?} -> {:?}", from, to);
        }

        Ok(())
    }

    fn resolve_source(&self, from: &str) -> PathBuf {
        let path = Path::new(from);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

fn copy_dir_recursive(source: &Path, destination: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(destination)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = destination.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            if dst_path.exists() {
                std::fs::remove_file(&dst_path)?;
            }
            std::fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_file_overrides_additional_file_of_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path();
        std::fs::write(work.join("remote-copy.cfg"), b"remote").unwrap();
        std::fs::create_dir_all(work.join("local")).unwrap();
        std::fs::write(work.join("local/server.cfg"), b"local").unwrap();

        let base = work.join("server");
        let downloader = Downloader::new(reqwest::Client::new(), work.to_path_buf());
        let manager = FileManager::new(&downloader, work, &base);

        manager
            .install_additional_files(&[AdditionalFile {
                url: format!("file://{}", work.join("remote-copy.cfg").display()),
                destination: "config/server.cfg".into(),
                sha1: None,
            }])
            .await
            .unwrap();
        assert_eq!(std::fs::read(base.join("config/server.cfg")).unwrap(), b"remote");

        manager
            .install_local_files(&[LocalFile {
                from: "local/server.cfg".into(),
                to: "config/server.cfg".into(),
            }])
            .await
            .unwrap();
        assert_eq!(std::fs::read(base.join("config/server.cfg")).unwrap(), b"local");
    }

    #[tokio::test]
    async fn local_directories_are_copied_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path();
        std::fs::create_dir_all(work.join("extra/scripts/nested")).unwrap();
        std::fs::write(work.join("extra/scripts/nested/a.zs"), b"a").unwrap();

        let base = work.join("server");
        let downloader = Downloader::new(reqwest::Client::new(), work.to_path_buf());
        FileManager::new(&downloader, work, &base)
            .install_local_files(&[LocalFile {
                from: "extra/scripts".into(),
                to: "scripts".into(),
            }])
            .await
            .unwrap();

        assert!(base.join("scripts/nested/a.zs").exists());
    }

    #[tokio::test]
    async fn missing_local_file_fails_the_step() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(reqwest::Client::new(), dir.path().to_path_buf());
        let err = FileManager::new(&downloader, dir.path(), dir.path())
            .install_local_files(&[LocalFile {
                from: "missing.jar".into(),
                to: "mods/missing.jar".into(),
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, StarterError::Io { .. }));
    }
}
