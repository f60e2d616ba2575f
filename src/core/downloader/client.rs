use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{StarterError, StarterResult};

/// A single file to download with optional SHA-1 for validation.
#[derive(Debug, Clone)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
}

/// Where a configured URL actually points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

impl Source {
    /// `file://` URLs and plain paths are local, `http(s)://` is remote.
    /// Relative paths resolve against `working_dir`.
    pub fn parse(raw: &str, working_dir: &Path) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Source::Remote(raw.to_string());
        }

        let path = PathBuf::from(raw.strip_prefix("file://").unwrap_or(raw));
        if path.is_absolute() {
            Source::Local(path)
        } else {
            Source::Local(working_dir.join(path))
        }
    }
}

/// Streaming, SHA-1 validated downloader. Local sources are copied.
pub struct Downloader {
    client: Client,
    /// Relative local sources resolve against this directory.
    working_dir: PathBuf,
    /// Maximum number of parallel downloads in a batch.
    concurrency: usize,
}

impl Downloader {
    pub fn new(client: Client, working_dir: PathBuf) -> Self {
        Self {
            client,
            working_dir,
            concurrency: 8,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // ── Single file download ────────────────────────────

    /// Fetch `url` to `dest`, optionally validating SHA-1.
    ///
    /// Creates parent directories as needed. The body is streamed into a
    /// `.part` file that only replaces `dest` once complete and verified.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> StarterResult<()> {
        ensure_parent(dest).await?;

        match Source::parse(url, &self.working_dir) {
            Source::Local(path) => {
                copy_local(&path, dest).await?;
                if let Some(expected) = sha1_expected {
                    verify_sha1(dest, expected).await?;
                }
            }
            Source::Remote(url) => {
                let response = self.client.get(&url).send().await?;
                self.stream_to_file(response, &url, dest, sha1_expected)
                    .await?;
            }
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }

    /// Fetch `url` into `dir`, naming the file after the last path segment
    /// of the final (post-redirect) URL. Returns the written path.
    pub async fn download_into_dir(&self, url: &str, dir: &Path) -> StarterResult<PathBuf> {
        match Source::parse(url, &self.working_dir) {
            Source::Local(path) => {
                let name = path
                    .file_name()
                    .ok_or_else(|| StarterError::Other(format!("No file name in {}", url)))?;
                let dest = dir.join(name);
                ensure_parent(&dest).await?;
                copy_local(&path, &dest).await?;
                Ok(dest)
            }
            Source::Remote(url) => {
                let response = self.client.get(&url).send().await?;
                let name = file_name_from_url(response.url().path())
                    .ok_or_else(|| StarterError::Other(format!("No file name in {}", url)))?;
                let dest = dir.join(name);
                ensure_parent(&dest).await?;
                self.stream_to_file(response, &url, &dest, None).await?;
                debug!("Downloaded: {} -> {:?}", url, dest);
                Ok(dest)
            }
        }
    }

    async fn stream_to_file(
        &self,
        response: reqwest::Response,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> StarterResult<()> {
        let status = response.status();
        if !status.is_success() {
            return Err(StarterError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let part = part_path(dest);
        let mut hasher = Sha1::new();

        // Write inside a block so the handle is dropped before the rename.
        {
            let mut file = tokio::fs::File::create(&part)
                .await
                .map_err(|e| StarterError::io(&part, e))?;
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                hasher.update(&chunk);
                file.write_all(&chunk)
                    .await
                    .map_err(|e| StarterError::io(&part, e))?;
            }
            file.flush().await.map_err(|e| StarterError::io(&part, e))?;
        }

        if let Some(expected) = sha1_expected {
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(StarterError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| StarterError::io(dest, e))
    }

    // ── Batch concurrent downloads ──────────────────────

    /// Download many files concurrently using `buffer_unordered`.
    ///
    /// Returns the list of files that failed (if any).
    pub async fn download_batch(
        &self,
        entries: Vec<DownloadEntry>,
    ) -> Vec<(DownloadEntry, StarterError)> {
        info!(
            "Starting batch download: {} files, concurrency={}",
            entries.len(),
            self.concurrency
        );

        let results: Vec<_> = stream::iter(entries)
            .map(|entry| async move {
                let result = self
                    .download_file(&entry.url, &entry.dest, entry.sha1.as_deref())
                    .await;
                (entry, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(entry, result)| match result {
                Ok(()) => None,
                Err(e) => Some((entry, e)),
            })
            .collect()
    }
}

/// Validate an existing file's SHA-1.
pub async fn verify_sha1(path: &Path, expected: &str) -> StarterResult<()> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StarterError::io(path, e))?;
    let mut hasher = Sha1::new();
    hasher.update(&bytes);
    let actual = hex::encode(hasher.finalize());
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(StarterError::Sha1Mismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}

async fn copy_local(source: &Path, dest: &Path) -> StarterResult<()> {
    tokio::fs::copy(source, dest)
        .await
        .map_err(|e| StarterError::io(source, e))?;
    Ok(())
}

async fn ensure_parent(dest: &Path) -> StarterResult<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StarterError::io(parent, e))?;
    }
    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Decoded last path segment, rejected when it could leave the target dir.
fn file_name_from_url(path: &str) -> Option<String> {
    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    let decoded = urlencoding::decode(segment).ok()?.into_owned();
    if decoded == "download"
        || decoded.contains("..")
        || decoded.contains(['/', '\\'])
        || decoded.trim().is_empty()
    {
        return None;
    }
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parsing() {
        let wd = Path::new("/srv");
        assert_eq!(
            Source::parse("https://example.com/a.zip", wd),
            Source::Remote("https://example.com/a.zip".into())
        );
        assert_eq!(
            Source::parse("file:///tmp/a.zip", wd),
            Source::Local(PathBuf::from("/tmp/a.zip"))
        );
        assert_eq!(
            Source::parse("packs/a.zip", wd),
            Source::Local(PathBuf::from("/srv/packs/a.zip"))
        );
    }

    #[test]
    fn file_names_from_urls() {
        assert_eq!(
            file_name_from_url("/files/1234/567/jei-1.12.2.jar"),
            Some("jei-1.12.2.jar".into())
        );
        assert_eq!(
            file_name_from_url("/files/My%20Mod.jar/"),
            Some("My Mod.jar".into())
        );
        assert_eq!(file_name_from_url("/api/v1/mods/1/files/2/download"), None);
        assert_eq!(
            file_name_from_url("/files/1/2/%5B1.12.2%5Djei%27s.jar"),
            Some("[1.12.2]jei's.jar".into())
        );
        assert_eq!(
            file_name_from_url("/files/Jei%2B%2B%20Addon.jar"),
            Some("Jei++ Addon.jar".into())
        );
    }

    #[test]
    fn encoded_separators_and_parent_dirs_are_rejected() {
        assert_eq!(file_name_from_url("/files/..%2F..%2Fserver.properties"), None);
        assert_eq!(file_name_from_url("/files/%2E%2E"), None);
        assert_eq!(file_name_from_url("/files/evil%5Cmod.jar"), None);
        assert_eq!(file_name_from_url("/files/%FF%FE.jar"), None);
    }

    #[test]
    fn part_file_sits_next_to_destination() {
        assert_eq!(
            part_path(Path::new("/a/mods/x.jar")),
            PathBuf::from("/a/mods/x.jar.part")
        );
    }

    #[tokio::test]
    async fn local_sources_are_copied_and_verified() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("src.txt"), b"hello").unwrap();
        let downloader = Downloader::new(Client::new(), dir.path().to_path_buf());

        let dest = dir.path().join("out").join("dst.txt");
        // sha1("hello")
        downloader
            .download_file(
                "src.txt",
                &dest,
                Some("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"),
            )
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");

        let err = downloader
            .download_file("src.txt", &dest, Some("00"))
            .await
            .unwrap_err();
        assert!(matches!(err, StarterError::Sha1Mismatch { .. }));
    }

    #[tokio::test]
    async fn local_source_into_dir_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mod.jar"), b"jar").unwrap();
        let downloader = Downloader::new(Client::new(), dir.path().to_path_buf());

        let written = downloader
            .download_into_dir("mod.jar", &dir.path().join("mods"))
            .await
            .unwrap();
        assert_eq!(written, dir.path().join("mods").join("mod.jar"));
        assert!(written.exists());
    }
}
