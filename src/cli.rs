//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! Argument values are merged over environment-derived defaults by `main`.

use clap::Parser;
use std::path::PathBuf;

/// stencil - download a template into a directory.
#[derive(Debug, Parser)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Template to download: gh:org/repo/subdir#ref, owner/repo, a URL, or a registry name
    pub template: Option<String>,

    /// Destination directory (defaults to the template's directory name)
    pub dir: Option<String>,

    /// Extract into an existing non-empty destination
    #[arg(short, long)]
    pub force: bool,

    /// Delete any existing destination before extraction (data loss!)
    #[arg(long)]
    pub force_clean: bool,

    /// Never touch the network; use the cached tarball or fail
    #[arg(long)]
    pub offline: bool,

    /// Skip the network when a cached tarball exists
    #[arg(long)]
    pub prefer_offline: bool,

    /// Open a shell in the destination after extraction
    #[arg(short, long)]
    pub shell: bool,

    /// Custom registry endpoint
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Disable registry lookup for bare names
    #[arg(long, conflicts_with = "registry")]
    pub no_registry: bool,

    /// Bearer token for provider and registry requests
    #[arg(long, value_name = "TOKEN")]
    pub auth: Option<String>,

    /// Base directory for resolving the destination
    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_template_and_dir() {
        let cli = Cli::parse_from(["stencil", "gh:org/repo", "my-app"]);
        assert_eq!(cli.template.as_deref(), Some("gh:org/repo"));
        assert_eq!(cli.dir.as_deref(), Some("my-app"));
        assert!(!cli.force);
    }

    #[test]
    fn template_is_optional_at_parse_time() {
        let cli = Cli::parse_from(["stencil"]);
        assert!(cli.template.is_none());
    }

    #[test]
    fn registry_flags_conflict() {
        let result =
            Cli::try_parse_from(["stencil", "t", "--registry", "https://r", "--no-registry"]);
        assert!(result.is_err());
    }

    #[test]
    fn offline_flags_parse() {
        let cli = Cli::parse_from(["stencil", "t", "--offline", "--prefer-offline"]);
        assert!(cli.offline);
        assert!(cli.prefer_offline);
    }
}
