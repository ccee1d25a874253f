//! Cache-aware tarball downloading.
//!
//! A download is skipped entirely when the remote ETag matches the cached
//! sidecar and the tarball is already on disk. `HEAD` failures are tolerated
//! (treated as "no ETag known"); `GET` failures surface to the caller, which
//! may fall back to a cached tarball.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::Path;

use reqwest::blocking::{Client, RequestBuilder};
use tracing::debug;

use crate::cache::{read_cached_etag, write_cached_etag};
use crate::error::{Result, StencilError};
use crate::providers::http::build_client;

/// How a tarball ended up on disk.
///
/// `CacheFallback` is never produced by [`Downloader::download`] itself; the
/// orchestrator maps a failed download with a usable cached tarball to it,
/// keeping the fallback a visible branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Body was fetched over the network.
    Fetched,
    /// Remote ETag matched the cached tarball; no body fetch.
    CacheHit,
    /// Network failed but an earlier cached tarball was used.
    CacheFallback,
}

/// Downloads tarballs through the ETag sidecar cache.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            client: build_client(),
        }
    }

    /// Download `url` to `dest`, honoring the cached ETag.
    ///
    /// Writes the tarball before the sidecar so a present sidecar always
    /// describes the bytes on disk.
    pub fn download(
        &self,
        url: &str,
        dest: &Path,
        headers: &HashMap<String, String>,
    ) -> Result<FetchOutcome> {
        let cached_etag = read_cached_etag(dest);
        let remote_etag = self.head_etag(url, headers);

        if let (Some(cached), Some(remote)) = (&cached_etag, &remote_etag) {
            if cached == remote && dest.exists() {
                debug!("ETag unchanged for {}, using cached tarball", url);
                return Ok(FetchOutcome::CacheHit);
            }
        }

        let response = with_headers(self.client.get(url), headers)
            .send()
            .map_err(|e| StencilError::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(StencilError::Download {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let get_etag = header_value(response.headers(), "etag");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(dest)?;
        let mut body = response;
        io::copy(&mut body, &mut file)?;

        write_cached_etag(dest, remote_etag.or(get_etag).as_deref())?;
        debug!("Downloaded {} to {}", url, dest.display());
        Ok(FetchOutcome::Fetched)
    }

    // HEAD failure is a documented recoverable case: no ETag known.
    fn head_etag(&self, url: &str, headers: &HashMap<String, String>) -> Option<String> {
        match with_headers(self.client.head(url), headers).send() {
            Ok(response) if response.status().is_success() => {
                header_value(response.headers(), "etag")
            }
            Ok(response) => {
                debug!("HEAD {} returned {}, proceeding without ETag", url, response.status());
                None
            }
            Err(e) => {
                debug!("HEAD {} failed ({}), proceeding without ETag", url, e);
                None
            }
        }
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers(mut request: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    for (key, value) in headers {
        request = request.header(key, value);
    }
    request
}

fn header_value(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
