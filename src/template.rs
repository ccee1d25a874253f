//! Normalized template descriptors.
//!
//! Every provider, whatever its input shape, produces a [`TemplateInfo`].
//! Registry JSON documents arrive as [`RawTemplateInfo`] and are validated
//! into the same contract. Provider-specific extra fields round-trip through
//! an explicit side-map instead of weakening the required core fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StencilError};

/// Normalized descriptor of a resolved template.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateInfo {
    /// Template name, sanitized by the orchestrator before path use.
    pub name: String,
    /// Tarball download URL.
    pub tar: String,
    /// Version or ref label, used as the cache file name when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Sub-directory to re-root extraction to, leading-slash form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdir: Option<String>,
    /// Human-browsable page for the resolved ref, display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Default destination directory name, falls back to `name`.
    #[serde(rename = "defaultDir", skip_serializing_if = "Option::is_none")]
    pub default_dir: Option<String>,
    /// Headers sent with the tarball request (e.g. authorization).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Provider-specific fields preserved for round-trip.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TemplateInfo {
    /// Minimal descriptor with just the required fields.
    pub fn new(name: impl Into<String>, tar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tar: tar.into(),
            version: None,
            subdir: None,
            url: None,
            default_dir: None,
            headers: HashMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Registry/JSON document shape before validation.
///
/// `name` and `tar` are optional here so a missing field surfaces as
/// [`StencilError::InvalidTemplateInfo`] naming the document URL, not as a
/// deserialization error.
#[derive(Debug, Deserialize)]
pub struct RawTemplateInfo {
    pub name: Option<String>,
    pub tar: Option<String>,
    pub version: Option<String>,
    pub subdir: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "defaultDir")]
    pub default_dir: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawTemplateInfo {
    /// Validate the required fields, citing `url` on failure.
    pub fn validate(self, url: &str) -> Result<TemplateInfo> {
        let missing = |field: &str| StencilError::InvalidTemplateInfo {
            url: url.to_string(),
            message: format!("missing required field '{field}'"),
        };

        Ok(TemplateInfo {
            name: self.name.ok_or_else(|| missing("name"))?,
            tar: self.tar.ok_or_else(|| missing("tar"))?,
            version: self.version,
            subdir: self.subdir,
            url: self.url,
            default_dir: self.default_dir,
            headers: self.headers,
            extra: self.extra,
        })
    }
}

/// Restrict a name to `[A-Za-z0-9-]`, substituting `-` for everything else.
///
/// Idempotent; applied to `name` and `default_dir` before either is used as
/// a path segment.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}
