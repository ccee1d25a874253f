//! Remote registry provider.
//!
//! A registry is an HTTP service (or static file tree) mapping short names
//! to template JSON documents: `GET {endpoint}/{name}.json` must return an
//! object with required `name` and `tar` keys.

use reqwest::blocking::Client;

use super::http::{build_client, fetch_template_json};
use super::{Provider, ProviderContext};
use crate::error::Result;
use crate::template::TemplateInfo;

/// Endpoint used when no registry URL is configured.
pub const DEFAULT_REGISTRY: &str =
    "https://raw.githubusercontent.com/stencil-dev/registry/main/templates";

/// Provider bound to one registry endpoint.
pub struct RegistryProvider {
    endpoint: String,
    client: Client,
}

impl RegistryProvider {
    /// Create a provider for the given endpoint (trailing slash tolerated).
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: build_client(),
        }
    }

    /// The bound endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Provider for RegistryProvider {
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> Result<Option<TemplateInfo>> {
        let url = format!("{}/{}.json", self.endpoint, source);
        fetch_template_json(&self.client, &url, ctx).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StencilError;
    use httpmock::prelude::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let provider = RegistryProvider::new("https://r.example/templates/");
        assert_eq!(provider.endpoint(), "https://r.example/templates");
    }

    #[test]
    fn resolves_name_to_json_document() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates/nuxt.json");
            then.status(200)
                .body(r#"{"name":"nuxt","tar":"https://e.com/nuxt.tar.gz","defaultDir":"nuxt-app"}"#);
        });

        let provider = RegistryProvider::new(&server.url("/templates"));
        let info = provider
            .resolve("nuxt", &ProviderContext::default())
            .unwrap()
            .unwrap();

        assert_eq!(info.name, "nuxt");
        assert_eq!(info.default_dir.as_deref(), Some("nuxt-app"));
    }

    #[test]
    fn document_without_tar_is_invalid() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates/test.json");
            then.status(200).body(r#"{"name":"x"}"#);
        });

        let provider = RegistryProvider::new(&server.url("/templates"));
        let err = provider
            .resolve("test", &ProviderContext::default())
            .unwrap_err();
        assert!(matches!(err, StencilError::InvalidTemplateInfo { .. }));
    }

    #[test]
    fn missing_document_is_a_download_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates/nope.json");
            then.status(404);
        });

        let provider = RegistryProvider::new(&server.url("/templates"));
        let err = provider
            .resolve("nope", &ProviderContext::default())
            .unwrap_err();
        assert!(matches!(err, StencilError::Download { .. }));
    }
}
