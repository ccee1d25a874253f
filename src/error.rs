//! Error types for stencil operations.
//!
//! This module defines [`StencilError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `StencilError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `StencilError::Other`) for unexpected errors
//! - All errors carry enough context (provider name, URL, path) to diagnose
//!   a failure without re-running in verbose mode

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stencil operations.
#[derive(Debug, Error)]
pub enum StencilError {
    /// No provider is registered under the given name.
    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    /// A provider failed or declined to resolve the input.
    #[error("Failed to {action} template from {provider}: {message}")]
    ProviderResolution {
        provider: String,
        action: &'static str,
        message: String,
    },

    /// A resolved template document is missing required fields.
    #[error("Invalid template info from {url}: {message}")]
    InvalidTemplateInfo { url: String, message: String },

    /// Tarball or registry download failed.
    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// No tarball on disk after download/offline policy was applied.
    #[error("Tarball not found: {path} (offline: {offline})")]
    TarballMissing { path: PathBuf, offline: bool },

    /// Destination directory exists and is not empty.
    #[error("Destination already exists: {path}")]
    DestinationConflict { path: PathBuf },

    /// Archive read or entry write failed.
    #[error("Failed to extract {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StencilError {
    /// Wrap a provider failure with the provider name for context.
    pub fn provider_failure(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderResolution {
            provider: provider.to_string(),
            action: "download",
            message: message.into(),
        }
    }

    /// A provider returned nothing for the given input.
    pub fn provider_unresolved(provider: &str, source: &str) -> Self {
        Self::ProviderResolution {
            provider: provider.to_string(),
            action: "resolve",
            message: format!("no result for '{source}'"),
        }
    }
}

/// Result type alias for stencil operations.
pub type Result<T> = std::result::Result<T, StencilError>;
