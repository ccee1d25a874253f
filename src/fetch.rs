//! Template download orchestration.
//!
//! [`download_template`] composes provider dispatch, the ETag-aware
//! downloader, and the extractor into one operation: resolve the input,
//! fetch (or reuse) the cached tarball, check the destination, extract.
//!
//! One logical operation per call, blocking I/O, no internal parallelism.
//! Concurrent calls sharing a cache path are not coordinated and may race
//! on the tarball/sidecar pair; calls with different destinations are fully
//! independent. There is no retry loop — falling back to a cached tarball
//! on network failure is the only resilience mechanism.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::cache::{default_cache_dir, TarballCache};
use crate::config::DownloadOptions;
use crate::download::{Downloader, FetchOutcome};
use crate::error::{Result, StencilError};
use crate::extract::extract_tarball;
use crate::providers::{split_input, ProviderContext, ProviderRegistry};
use crate::template::{sanitize_name, TemplateInfo};

/// Result of a successful [`download_template`] call.
#[derive(Debug, Clone)]
pub struct DownloadedTemplate {
    /// The resolved template, after name/default-dir sanitization.
    pub info: TemplateInfo,
    /// Provider-local remainder of the original input (prefix stripped).
    pub source: String,
    /// Absolute extraction path.
    pub dir: PathBuf,
    /// How the tarball was obtained.
    pub outcome: FetchOutcome,
}

/// Resolve, download, and extract a template.
///
/// Fails with a descriptive error for every precondition violation;
/// otherwise guarantees the destination directory exists and contains the
/// extracted, subdir-rewritten template contents.
pub fn download_template(input: &str, options: DownloadOptions) -> Result<DownloadedTemplate> {
    let DownloadOptions {
        dir,
        cwd,
        force,
        force_clean,
        offline,
        prefer_offline,
        auth,
        registry,
        cache_dir,
        providers,
        hosts,
    } = options;

    // Resolve the provider and template info.
    let (provider_name, source) = split_input(input, registry.enabled());
    let table = ProviderRegistry::new(providers, &hosts, &registry);
    let provider = table.get(&provider_name)?;
    let ctx = ProviderContext { auth: auth.clone() };

    let mut template = match provider.resolve(&source, &ctx) {
        Ok(Some(info)) => info,
        Ok(None) => return Err(StencilError::provider_unresolved(&provider_name, &source)),
        // Invalid template documents keep their own error kind; everything
        // else is wrapped with the provider name.
        Err(err @ StencilError::InvalidTemplateInfo { .. }) => return Err(err),
        Err(err) => return Err(StencilError::provider_failure(&provider_name, err.to_string())),
    };

    // Sanitize the two fields used as path segments.
    template.name = non_empty_or(sanitize_name(&template.name), "template");
    let default_dir = template
        .default_dir
        .as_deref()
        .map(sanitize_name)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| template.name.clone());
    template.default_dir = Some(default_dir.clone());

    let cache = TarballCache::new(cache_dir.unwrap_or_else(default_cache_dir));
    let tarball = cache.tarball_path(&provider_name, &template.name, template.version.as_deref());

    let offline = offline || (prefer_offline && tarball.exists());

    let outcome = if offline {
        debug!("Offline mode, using cached tarball at {}", tarball.display());
        FetchOutcome::CacheHit
    } else {
        // Caller auth first, provider headers layered on top: a provider
        // that sets the same key wins.
        let mut headers = HashMap::new();
        if let Some(auth) = &auth {
            headers.insert("authorization".to_string(), format!("Bearer {auth}"));
        }
        headers.extend(template.headers.clone());

        match Downloader::new().download(&template.tar, &tarball, &headers) {
            Ok(outcome) => outcome,
            Err(err) if tarball.exists() => {
                warn!("Download failed ({err}), falling back to cached tarball");
                FetchOutcome::CacheFallback
            }
            Err(err) => return Err(err),
        }
    };

    // Unconditional precondition for extraction.
    if !tarball.exists() {
        return Err(StencilError::TarballMissing {
            path: tarball,
            offline,
        });
    }

    // Destination policy: never silently merge into an existing non-empty
    // directory unless forced.
    let base = match cwd {
        Some(path) => path,
        None => env::current_dir()?,
    };
    let base = if base.is_absolute() {
        base
    } else {
        env::current_dir()?.join(base)
    };
    let dest = base.join(dir.unwrap_or(default_dir));

    if force_clean && dest.exists() {
        fs::remove_dir_all(&dest)?;
    }
    if !force && dest.exists() && dest.read_dir()?.next().is_some() {
        return Err(StencilError::DestinationConflict { path: dest });
    }
    fs::create_dir_all(&dest)?;

    let subdir = template.subdir.clone().unwrap_or_default();
    let written = extract_tarball(&tarball, &dest, &subdir)?;
    debug!(
        "Extracted {} entries to {} ({:?})",
        written,
        dest.display(),
        outcome
    );

    Ok(DownloadedTemplate {
        info: template,
        source,
        dir: dest,
        outcome,
    })
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
