//! Direct-URL provider and the shared JSON template path.
//!
//! A plain URL is treated as a tarball; a `HEAD` request discovers a
//! friendlier name where possible. URLs ending in `.json` (or answering
//! with a JSON content type) are template documents instead, fetched and
//! validated against the [`TemplateInfo`] contract.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::{Provider, ProviderContext};
use crate::error::{Result, StencilError};
use crate::template::{RawTemplateInfo, TemplateInfo};

pub(crate) const USER_AGENT: &str = concat!("stencil/", env!("CARGO_PKG_VERSION"));

/// Build the blocking HTTP client used across the crate.
pub(crate) fn build_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client")
}

/// Fetch and validate a template JSON document.
///
/// Used by both the HTTP provider and the registry provider. Fails with
/// [`StencilError::InvalidTemplateInfo`] when the document is missing
/// `name` or `tar`.
pub fn fetch_template_json(client: &Client, url: &str, ctx: &ProviderContext) -> Result<TemplateInfo> {
    let mut request = client.get(url);
    if let Some(auth) = &ctx.auth {
        request = request.header("authorization", format!("Bearer {auth}"));
    }

    let response = request.send().map_err(|e| StencilError::Download {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(StencilError::Download {
            url: url.to_string(),
            message: format!("HTTP {}", response.status()),
        });
    }

    let raw: RawTemplateInfo = response.json().map_err(|e| StencilError::InvalidTemplateInfo {
        url: url.to_string(),
        message: format!("invalid JSON: {e}"),
    })?;

    raw.validate(url)
}

/// Provider for bare `http(s)://` inputs.
pub struct HttpProvider {
    client: Client,
}

impl HttpProvider {
    pub fn new() -> Self {
        Self {
            client: build_client(),
        }
    }
}

impl Default for HttpProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for HttpProvider {
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> Result<Option<TemplateInfo>> {
        if source.ends_with(".json") {
            return fetch_template_json(&self.client, source, ctx).map(Some);
        }

        // HEAD failures are non-fatal; fall back to the URL-derived name.
        let mut name = name_from_url(source);
        match self.client.head(source).send() {
            Ok(response) if response.status().is_success() => {
                let content_type = response
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                if content_type.contains("application/json") {
                    return fetch_template_json(&self.client, source, ctx).map(Some);
                }

                if let Some(filename) = response
                    .headers()
                    .get("content-disposition")
                    .and_then(|v| v.to_str().ok())
                    .and_then(disposition_filename)
                {
                    name = base_name(&filename);
                }
            }
            Ok(response) => {
                debug!("HEAD {} returned {}, using URL-derived name", source, response.status());
            }
            Err(e) => {
                debug!("HEAD {} failed ({}), using URL-derived name", source, e);
            }
        }

        let mut info = TemplateInfo::new(name, source);
        if let Some(auth) = &ctx.auth {
            info.headers
                .insert("authorization".to_string(), format!("Bearer {auth}"));
        }
        Ok(Some(info))
    }
}

/// Extract the `filename=` parameter from a content-disposition header.
fn disposition_filename(header: &str) -> Option<String> {
    let lower = header.to_ascii_lowercase();
    let start = lower.find("filename=")? + "filename=".len();
    let value = header[start..].split(';').next()?.trim();
    let value = value.trim_matches('"');
    (!value.is_empty()).then(|| value.to_string())
}

/// Name from the URL's last path segment, extensions stripped.
fn name_from_url(url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/');
    let segment = path.rsplit('/').next().unwrap_or(path);
    base_name(segment)
}

fn base_name(filename: &str) -> String {
    filename.split('.').next().unwrap_or(filename).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;

    #[test]
    fn name_derives_from_last_url_segment() {
        assert_eq!(name_from_url("https://e.com/files/my-template.tar.gz"), "my-template");
        assert_eq!(name_from_url("https://e.com/starter"), "starter");
        assert_eq!(name_from_url("https://e.com/kit.tgz?token=x"), "kit");
    }

    #[test]
    fn disposition_filename_handles_quoting() {
        assert_eq!(
            disposition_filename(r#"attachment; filename="starter.tar.gz""#).as_deref(),
            Some("starter.tar.gz")
        );
        assert_eq!(
            disposition_filename("attachment; filename=kit.tgz; size=10").as_deref(),
            Some("kit.tgz")
        );
        assert_eq!(disposition_filename("attachment"), None);
    }

    #[test]
    fn plain_url_becomes_tarball_info() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/dl/starter.tar.gz");
            then.status(200).header("content-type", "application/gzip");
        });

        let url = server.url("/dl/starter.tar.gz");
        let info = HttpProvider::new()
            .resolve(&url, &ProviderContext::default())
            .unwrap()
            .unwrap();

        assert_eq!(info.name, "starter");
        assert_eq!(info.tar, url);
    }

    #[test]
    fn content_disposition_wins_over_url_name() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/dl/x");
            then.status(200)
                .header("content-disposition", r#"attachment; filename="nice-name.tgz""#);
        });

        let info = HttpProvider::new()
            .resolve(&server.url("/dl/x"), &ProviderContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(info.name, "nice-name");
    }

    #[test]
    fn head_failure_falls_back_to_url_name() {
        // Nothing listens here; HEAD errors out.
        let info = HttpProvider::new()
            .resolve(
                "http://127.0.0.1:1/files/fallback.tar.gz",
                &ProviderContext::default(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(info.name, "fallback");
    }

    #[test]
    fn json_content_type_reroutes_to_template_document() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/t/info");
            then.status(200).header("content-type", "application/json");
        });
        server.mock(|when, then| {
            when.method(GET).path("/t/info");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"name":"doc","tar":"https://e.com/doc.tar.gz"}"#);
        });

        let info = HttpProvider::new()
            .resolve(&server.url("/t/info"), &ProviderContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(info.name, "doc");
        assert_eq!(info.tar, "https://e.com/doc.tar.gz");
    }

    #[test]
    fn json_suffix_skips_head_entirely() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates/vue.json");
            then.status(200)
                .body(r#"{"name":"vue","tar":"https://e.com/vue.tar.gz"}"#);
        });

        let info = HttpProvider::new()
            .resolve(&server.url("/templates/vue.json"), &ProviderContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(info.name, "vue");
    }

    #[test]
    fn json_document_missing_tar_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/t.json");
            then.status(200).body(r#"{"name":"x"}"#);
        });

        let err = HttpProvider::new()
            .resolve(&server.url("/t.json"), &ProviderContext::default())
            .unwrap_err();
        assert!(matches!(err, StencilError::InvalidTemplateInfo { .. }));
    }

    #[test]
    fn json_fetch_sends_bearer_auth() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/t.json")
                .header("authorization", "Bearer secret");
            then.status(200).body(r#"{"name":"x","tar":"t"}"#);
        });

        let ctx = ProviderContext {
            auth: Some("secret".to_string()),
        };
        HttpProvider::new()
            .resolve(&server.url("/t.json"), &ctx)
            .unwrap();
        mock.assert();
    }
}
