//! Template providers and dispatch.
//!
//! A provider turns a provider-local source string into a [`TemplateInfo`].
//! Dispatch order (first match wins):
//! 1. Caller-supplied provider overrides
//! 2. Built-in table (`gh`/`github`, `gitlab`, `bitbucket`, `sourcehut`,
//!    `http`, `https`)
//! 3. The remote registry provider, when registry lookup is enabled
//!
//! The registry is immutable after construction; overrides are merged per
//! call rather than by mutating shared state.

pub mod git;
pub mod http;
pub mod registry;

use std::collections::HashMap;

use crate::config::{HostOverrides, RegistrySetting};
use crate::error::{Result, StencilError};
use crate::template::TemplateInfo;

pub use git::{GitHost, GitHostProvider};
pub use http::HttpProvider;
pub use registry::{RegistryProvider, DEFAULT_REGISTRY};

/// Auth context handed to providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderContext {
    /// Bearer token for API and registry requests.
    pub auth: Option<String>,
}

/// A named resolver from source string to [`TemplateInfo`].
///
/// Returning `Ok(None)` signals "could not resolve", which the orchestrator
/// turns into a resolution failure naming the provider.
pub trait Provider {
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> Result<Option<TemplateInfo>>;
}

impl std::fmt::Debug for dyn Provider + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Provider")
    }
}

/// Split a raw input into `(provider_name, provider_local_source)`.
///
/// The first `:` separates the provider prefix, except for `http`/`https`
/// where the colon belongs to the URL and the full input passes through.
/// Inputs with no prefix default to `registry` when registry lookup is
/// enabled, else `github`.
pub fn split_input(input: &str, registry_enabled: bool) -> (String, String) {
    match input.split_once(':') {
        Some((name, _)) if name == "http" || name == "https" => {
            (name.to_string(), input.to_string())
        }
        Some((name, rest)) => (name.to_string(), rest.to_string()),
        None => {
            let name = if registry_enabled { "registry" } else { "github" };
            (name.to_string(), input.to_string())
        }
    }
}

/// Immutable mapping from provider name to implementation.
pub struct ProviderRegistry {
    providers: HashMap<String, Box<dyn Provider>>,
    registry_fallback: Option<RegistryProvider>,
}

impl ProviderRegistry {
    /// Build the dispatch table from overrides, built-ins, and the registry
    /// setting.
    pub fn new(
        overrides: HashMap<String, Box<dyn Provider>>,
        hosts: &HostOverrides,
        registry: &RegistrySetting,
    ) -> Self {
        let mut providers: HashMap<String, Box<dyn Provider>> = HashMap::new();

        for host in [
            GitHost::GitHub,
            GitHost::GitLab,
            GitHost::Bitbucket,
            GitHost::Sourcehut,
        ] {
            let provider = GitHostProvider::new(host, hosts);
            for alias in host.aliases() {
                providers.insert((*alias).to_string(), Box::new(provider.clone()));
            }
        }
        providers.insert("http".to_string(), Box::new(HttpProvider::new()));
        providers.insert("https".to_string(), Box::new(HttpProvider::new()));

        // Overrides shadow built-ins of the same name.
        for (name, provider) in overrides {
            providers.insert(name, provider);
        }

        let registry_fallback = match registry {
            RegistrySetting::Default => Some(RegistryProvider::new(DEFAULT_REGISTRY)),
            RegistrySetting::Endpoint(endpoint) => Some(RegistryProvider::new(endpoint)),
            RegistrySetting::Disabled => None,
        };

        Self {
            providers,
            registry_fallback,
        }
    }

    /// Look up a provider by name.
    ///
    /// Names not in the table fall through to the registry provider when
    /// registry lookup is enabled; otherwise the name is unsupported.
    pub fn get(&self, name: &str) -> Result<&dyn Provider> {
        if let Some(provider) = self.providers.get(name) {
            return Ok(provider.as_ref());
        }
        if let Some(fallback) = &self.registry_fallback {
            return Ok(fallback);
        }
        Err(StencilError::UnsupportedProvider {
            provider: name.to_string(),
        })
    }
}
