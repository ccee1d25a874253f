//! Template source grammar.
//!
//! Parses the compact identifier grammar `<owner>/<name>[<subdir>][#<ref>]`
//! into a [`SourceDescriptor`]. Parsing is pure and infallible: malformed
//! input yields a descriptor with `repo: None`, which providers reject.

use std::sync::LazyLock;

use regex::Regex;

/// Default ref used when the input carries no `#ref` suffix.
///
/// This is a policy default, not a discovered default branch. Repositories
/// whose default branch is `master` will 404 at the tarball endpoint unless
/// a ref is given explicitly.
pub const DEFAULT_REF: &str = "main";

/// Default subdir meaning "whole repository".
pub const DEFAULT_SUBDIR: &str = "/";

// Greedy two-segment repo token, then everything up to `#` as subdir.
static REPO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<repo>[\w.-]+/[\w.-]+)(?P<subdir>/[^#]*)?$").unwrap());

/// Structured form of a template identifier.
///
/// Immutable once parsed; consumed only by providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// `owner/name` repository token, `None` when the input is malformed.
    pub repo: Option<String>,
    /// Sub-directory within the repository, always leading-slash form.
    pub subdir: String,
    /// Git ref (branch, tag, or anything the host's tarball endpoint takes).
    pub git_ref: String,
}

/// Parse a template identifier into a [`SourceDescriptor`].
///
/// The ref is everything after the first `#` and may itself contain `/`,
/// `@`, `.` and `-`. The subdir is whatever follows the two-segment repo
/// token up to that `#`.
pub fn parse_source(input: &str) -> SourceDescriptor {
    let (head, git_ref) = match input.split_once('#') {
        Some((head, r)) if !r.is_empty() => (head, r.to_string()),
        Some((head, _)) => (head, DEFAULT_REF.to_string()),
        None => (input, DEFAULT_REF.to_string()),
    };

    match REPO_REGEX.captures(head) {
        Some(caps) => SourceDescriptor {
            repo: Some(caps["repo"].to_string()),
            subdir: caps
                .name("subdir")
                .map_or_else(|| DEFAULT_SUBDIR.to_string(), |m| m.as_str().to_string()),
            git_ref,
        },
        None => SourceDescriptor {
            repo: None,
            subdir: DEFAULT_SUBDIR.to_string(),
            git_ref,
        },
    }
}
