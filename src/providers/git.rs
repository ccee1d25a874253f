//! Built-in git-hosting providers.
//!
//! All four hosts share one resolution shape: parse the source grammar,
//! then template a host-specific tarball endpoint with the repo and ref.
//! No git protocol is involved; tarballs come over plain HTTP.

use anyhow::anyhow;

use super::{Provider, ProviderContext};
use crate::config::HostOverrides;
use crate::error::Result;
use crate::source::parse_source;
use crate::template::TemplateInfo;

/// Supported git hosting services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHost {
    GitHub,
    GitLab,
    Bitbucket,
    Sourcehut,
}

impl GitHost {
    /// Provider names this host is registered under.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::GitHub => &["gh", "github"],
            Self::GitLab => &["gitlab"],
            Self::Bitbucket => &["bitbucket"],
            Self::Sourcehut => &["sourcehut"],
        }
    }

    /// Default API/host base URL.
    fn default_base(self) -> &'static str {
        match self {
            Self::GitHub => "https://api.github.com",
            Self::GitLab => "https://gitlab.com",
            Self::Bitbucket => "https://bitbucket.org",
            Self::Sourcehut => "https://git.sr.ht",
        }
    }
}

/// Provider for one git hosting service, bound to a base URL.
#[derive(Debug, Clone)]
pub struct GitHostProvider {
    host: GitHost,
    base: String,
}

impl GitHostProvider {
    /// Create a provider for `host`, honoring any base URL override.
    pub fn new(host: GitHost, overrides: &HostOverrides) -> Self {
        let override_url = match host {
            GitHost::GitHub => overrides.github.as_deref(),
            GitHost::GitLab => overrides.gitlab.as_deref(),
            GitHost::Bitbucket => overrides.bitbucket.as_deref(),
            GitHost::Sourcehut => overrides.sourcehut.as_deref(),
        };
        Self {
            host,
            base: override_url
                .unwrap_or_else(|| host.default_base())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn tarball_url(&self, repo: &str, git_ref: &str) -> String {
        let base = &self.base;
        match self.host {
            GitHost::GitHub => format!("{base}/repos/{repo}/tarball/{git_ref}"),
            GitHost::GitLab => format!("{base}/{repo}/-/archive/{git_ref}.tar.gz"),
            GitHost::Bitbucket => format!("{base}/{repo}/get/{git_ref}.tar.gz"),
            GitHost::Sourcehut => format!("{base}/~{repo}/archive/{git_ref}.tar.gz"),
        }
    }

    // Display-only page for the resolved ref and subdir.
    fn browse_url(&self, repo: &str, git_ref: &str, subdir: &str) -> String {
        let base = &self.base;
        match self.host {
            GitHost::GitHub => format!("https://github.com/{repo}/tree/{git_ref}{subdir}"),
            GitHost::GitLab => format!("{base}/{repo}/-/tree/{git_ref}{subdir}"),
            GitHost::Bitbucket => format!("{base}/{repo}/src/{git_ref}{subdir}"),
            GitHost::Sourcehut => format!("{base}/~{repo}/tree/{git_ref}/item{subdir}"),
        }
    }
}

impl Provider for GitHostProvider {
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> Result<Option<TemplateInfo>> {
        let desc = parse_source(source);
        let repo = desc
            .repo
            .ok_or_else(|| anyhow!("invalid repository name in '{source}'"))?;

        let mut info = TemplateInfo::new(
            repo.replace('/', "-"),
            self.tarball_url(&repo, &desc.git_ref),
        );
        info.version = Some(desc.git_ref.clone());
        info.subdir = Some(desc.subdir.clone());
        info.url = Some(self.browse_url(&repo, &desc.git_ref, &desc.subdir));
        if let Some(auth) = &ctx.auth {
            info.headers
                .insert("authorization".to_string(), format!("Bearer {auth}"));
        }

        Ok(Some(info))
    }
}
