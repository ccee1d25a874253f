//! stencil - download and extract project templates.
//!
//! stencil resolves a short template identifier (e.g. `gh:org/repo/subdir#ref`,
//! a bare `owner/repo`, an `http(s)://` URL, or a registry short-name) into a
//! tarball, downloads it through an ETag-aware disk cache with offline
//! fallback, and extracts a chosen sub-directory into a destination folder.
//!
//! # Modules
//!
//! - [`cache`] - Tarball cache paths and ETag sidecar metadata
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Download options and the environment boundary
//! - [`download`] - Cache-aware tarball downloading
//! - [`error`] - Error types and result aliases
//! - [`extract`] - Tarball extraction with path rewriting
//! - [`fetch`] - The `download_template` orchestrator
//! - [`providers`] - Template providers and dispatch
//! - [`source`] - The template identifier grammar
//! - [`template`] - Normalized template descriptors
//!
//! # Example
//!
//! ```no_run
//! use stencil::{download_template, DownloadOptions};
//!
//! let result = download_template("gh:org/starter#main", DownloadOptions::default())?;
//! println!("extracted to {}", result.dir.display());
//! # Ok::<(), stencil::StencilError>(())
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod providers;
pub mod source;
pub mod template;

pub use config::DownloadOptions;
pub use download::FetchOutcome;
pub use error::{Result, StencilError};
pub use fetch::{download_template, DownloadedTemplate};
pub use template::TemplateInfo;
