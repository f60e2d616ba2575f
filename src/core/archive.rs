// ─── Archive Extraction ───
// Unpacks modpack zips into the install root.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{StarterError, StarterResult};

/// Which entries of an archive land where.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractOptions<'a> {
    /// Only entries below this folder are extracted, with the folder removed
    /// from their path (e.g. `overrides/`).
    pub strip_prefix: Option<&'a str>,
    /// Entries whose relative path starts with one of these are skipped.
    pub ignore: &'a [String],
}

/// Open a zip file from disk.
pub fn open_zip(path: &Path) -> StarterResult<zip::ZipArchive<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|e| StarterError::io(path, e))?;
    Ok(zip::ZipArchive::new(file)?)
}

/// Read a single entry as UTF-8 text.
pub fn read_entry<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> StarterResult<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut text = String::new();
    entry.read_to_string(&mut text)?;
    Ok(Some(text))
}

/// Folders a server install uses as-is; never treated as a wrapper.
const SERVER_FOLDERS: &[&str] = &[
    "mods",
    "config",
    "defaultconfigs",
    "scripts",
    "kubejs",
    "libraries",
    "resources",
    "world",
    "plugins",
];

/// The single top-level wrapper folder every entry shares, if there is one.
///
/// A shared folder that is itself part of a server layout (`mods/`,
/// `config/`, ...) is kept.
pub fn common_root<R: Read + std::io::Seek>(archive: &zip::ZipArchive<R>) -> Option<String> {
    let mut root: Option<&str> = None;
    for name in archive.file_names() {
        let (first, rest) = name.split_once('/')?;
        if first.is_empty() {
            return None;
        }
        // A bare file at the top level means there is no shared folder.
        if rest.is_empty() && !name.ends_with('/') {
            return None;
        }
        match root {
            None => root = Some(first),
            Some(r) if r == first => {}
            Some(_) => return None,
        }
    }
    root.filter(|r| !is_server_folder(r))
        .map(|r| format!("{}/", r))
}

fn is_server_folder(name: &str) -> bool {
    SERVER_FOLDERS.iter().any(|f| f.eq_ignore_ascii_case(name))
}

/// Whether `relative` is covered by one of the ignore prefixes.
pub fn is_ignored(relative: &str, ignore: &[String]) -> bool {
    let relative = relative.trim_start_matches("./").to_ascii_lowercase();
    ignore.iter().any(|pattern| {
        let pattern = pattern.trim_start_matches("./").to_ascii_lowercase();
        !pattern.is_empty() && relative.starts_with(&pattern)
    })
}

/// Extract `archive` into `dest`. Returns the number of files written.
///
/// Entries escaping `dest` (zip-slip) are rejected.
pub fn extract_zip<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    dest: &Path,
    options: ExtractOptions<'_>,
) -> StarterResult<usize> {
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(enclosed) = entry.enclosed_name() else {
            return Err(StarterError::Pack(format!(
                "Archive entry escapes the install folder: {}",
                entry.name()
            )));
        };
        let name = enclosed.to_string_lossy().replace('\\', "/");

        let relative = match options.strip_prefix {
            Some(prefix) => match name.strip_prefix(prefix.trim_end_matches('/')) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                    rest.trim_start_matches('/').to_string()
                }
                _ => continue,
            },
            None => name,
        };

        if relative.is_empty() {
            continue;
        }
        if is_ignored(&relative, options.ignore) {
            debug!("Ignoring archive entry {}", relative);
            continue;
        }

        let target: PathBuf = dest.join(&relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| StarterError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StarterError::io(parent, e))?;
        }
        let mut out = std::fs::File::create(&target).map_err(|e| StarterError::io(&target, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| StarterError::io(&target, e))?;
        written += 1;
    }

    Ok(written)
}
