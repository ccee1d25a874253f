//! Download configuration.
//!
//! [`DownloadOptions`] is the single configuration value threaded through
//! the orchestrator and providers. Environment variables are read exactly
//! once, in [`DownloadOptions::from_env`], at the CLI/library boundary; core
//! logic never touches `std::env`.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::providers::Provider;

/// Per-provider host overrides for private or self-hosted instances.
#[derive(Debug, Clone, Default)]
pub struct HostOverrides {
    /// GitHub API base (default `https://api.github.com`).
    pub github: Option<String>,
    /// GitLab host (default `https://gitlab.com`).
    pub gitlab: Option<String>,
    /// Bitbucket host (default `https://bitbucket.org`).
    pub bitbucket: Option<String>,
    /// Sourcehut host (default `https://git.sr.ht`).
    pub sourcehut: Option<String>,
}

/// Registry lookup configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegistrySetting {
    /// Use the built-in default registry endpoint.
    #[default]
    Default,
    /// Use a custom registry endpoint.
    Endpoint(String),
    /// Disable registry lookup entirely.
    Disabled,
}

impl RegistrySetting {
    /// Whether registry lookup participates in provider dispatch.
    pub fn enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// Assembled configuration for one `download_template` call.
///
/// Read-only for the duration of the call. Caller-supplied fields win over
/// environment-derived defaults.
#[derive(Default)]
pub struct DownloadOptions {
    /// Destination directory, relative to `cwd`. Defaults to the template's
    /// `default_dir`.
    pub dir: Option<String>,
    /// Base directory for resolving `dir`. Defaults to the process cwd.
    pub cwd: Option<PathBuf>,
    /// Allow extraction into an existing non-empty destination.
    pub force: bool,
    /// Delete any existing destination before extraction.
    pub force_clean: bool,
    /// Never touch the network; use the cached tarball or fail.
    pub offline: bool,
    /// Skip the network when a cached tarball exists.
    pub prefer_offline: bool,
    /// Bearer token sent to providers and with tarball requests.
    pub auth: Option<String>,
    /// Registry lookup behavior.
    pub registry: RegistrySetting,
    /// Cache root override. Defaults to the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Caller-supplied providers, consulted before the built-in table.
    pub providers: HashMap<String, Box<dyn Provider>>,
    /// Host overrides for the built-in git providers.
    pub hosts: HostOverrides,
}

impl DownloadOptions {
    /// Build options from `STENCIL_*` environment variables.
    ///
    /// Read: `STENCIL_REGISTRY`, `STENCIL_AUTH`, `STENCIL_CACHE_DIR`,
    /// `STENCIL_GITHUB_URL`, `STENCIL_GITLAB_URL`, `STENCIL_BITBUCKET_URL`,
    /// `STENCIL_SOURCEHUT_URL`.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());

        Self {
            auth: non_empty("STENCIL_AUTH"),
            registry: non_empty("STENCIL_REGISTRY")
                .map_or(RegistrySetting::Default, RegistrySetting::Endpoint),
            cache_dir: non_empty("STENCIL_CACHE_DIR").map(PathBuf::from),
            hosts: HostOverrides {
                github: non_empty("STENCIL_GITHUB_URL"),
                gitlab: non_empty("STENCIL_GITLAB_URL"),
                bitbucket: non_empty("STENCIL_BITBUCKET_URL"),
                sourcehut: non_empty("STENCIL_SOURCEHUT_URL"),
            },
            ..Self::default()
        }
    }
}
