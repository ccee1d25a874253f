//! On-disk tarball cache.
//!
//! Tarballs are cached under `{root}/{provider}/{name}/{version}.tar.gz`
//! with a `.json` sidecar holding the last-seen ETag. The sidecar is only
//! trusted when its paired tarball exists; the downloader writes the
//! tarball before the sidecar to keep the pair consistent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Get the default cache root directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stencil")
}

/// Sidecar metadata stored next to each cached tarball.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheMetadata {
    /// ETag of the tarball bytes currently on disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// Tarball cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct TarballCache {
    root: PathBuf,
}

impl TarballCache {
    /// Create a cache handle (no directories are created yet).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache location for a resolved template's tarball.
    ///
    /// Keyed by `(provider, name, version-or-name)`; the name is sanitized
    /// by the orchestrator before this is called, the version is used as-is
    /// (a `/` in a ref just nests the cache one level deeper).
    pub fn tarball_path(&self, provider: &str, name: &str, version: Option<&str>) -> PathBuf {
        self.root
            .join(provider)
            .join(name)
            .join(format!("{}.tar.gz", version.unwrap_or(name)))
    }
}

fn sidecar_path(tarball: &Path) -> PathBuf {
    let mut name = tarball.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

/// Read the cached ETag for a tarball.
///
/// Returns `None` when the tarball itself is missing (a sidecar without its
/// tarball is stale) or when the sidecar is absent or unreadable.
pub fn read_cached_etag(tarball: &Path) -> Option<String> {
    if !tarball.exists() {
        return None;
    }
    let json = fs::read_to_string(sidecar_path(tarball)).ok()?;
    match serde_json::from_str::<CacheMetadata>(&json) {
        Ok(meta) => meta.etag,
        Err(e) => {
            debug!("Ignoring unreadable cache sidecar for {}: {}", tarball.display(), e);
            None
        }
    }
}

/// Persist the ETag sidecar for a tarball already on disk.
pub fn write_cached_etag(tarball: &Path, etag: Option<&str>) -> Result<()> {
    let meta = CacheMetadata {
        etag: etag.map(String::from),
    };
    let json = serde_json::to_string(&meta).map_err(|e| anyhow::anyhow!(e))?;
    fs::write(sidecar_path(tarball), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_cache_dir_ends_with_crate_name() {
        assert!(default_cache_dir().ends_with("stencil"));
    }

    #[test]
    fn tarball_path_uses_version() {
        let cache = TarballCache::new("/cache");
        let path = cache.tarball_path("github", "org-repo", Some("v1.2"));
        assert_eq!(path, PathBuf::from("/cache/github/org-repo/v1.2.tar.gz"));
    }

    #[test]
    fn tarball_path_falls_back_to_name() {
        let cache = TarballCache::new("/cache");
        let path = cache.tarball_path("http", "starter", None);
        assert_eq!(path, PathBuf::from("/cache/http/starter/starter.tar.gz"));
    }

    #[test]
    fn etag_round_trips() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("t.tar.gz");
        fs::write(&tarball, b"bytes").unwrap();

        write_cached_etag(&tarball, Some("\"abc\"")).unwrap();
        assert_eq!(read_cached_etag(&tarball).as_deref(), Some("\"abc\""));
    }

    #[test]
    fn sidecar_without_tarball_is_not_trusted() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("t.tar.gz");

        fs::write(sidecar_path(&tarball), r#"{"etag":"\"abc\""}"#).unwrap();
        assert_eq!(read_cached_etag(&tarball), None);
    }

    #[test]
    fn corrupt_sidecar_is_ignored() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("t.tar.gz");
        fs::write(&tarball, b"bytes").unwrap();
        fs::write(sidecar_path(&tarball), "not json").unwrap();

        assert_eq!(read_cached_etag(&tarball), None);
    }

    #[test]
    fn missing_sidecar_reads_as_no_cache() {
        let temp = TempDir::new().unwrap();
        let tarball = temp.path().join("t.tar.gz");
        fs::write(&tarball, b"bytes").unwrap();

        assert_eq!(read_cached_etag(&tarball), None);
    }
}
