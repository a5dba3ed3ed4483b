//! Share link assembly.

use axum::http::{header, HeaderMap};

/// Builds absolute share links.
///
/// A configured public URL wins. Otherwise the base comes from the request
/// (`X-Forwarded-Proto` + `Host`), falling back to the bind address.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    public_url: Option<String>,
    fallback_host: String,
}

impl LinkBuilder {
    /// Create a link builder.
    pub fn new(public_url: Option<String>, fallback_host: impl Into<String>) -> Self {
        Self {
            public_url: public_url
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            fallback_host: fallback_host.into(),
        }
    }

    /// Absolute link to the landing page of `id`.
    pub fn share_link(&self, headers: &HeaderMap, id: &str) -> String {
        format!("{}/dl/{}", self.base_url(headers), id)
    }

    /// Scheme and authority links are built on.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(url) = &self.public_url {
            return url.clone();
        }

        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|proto| matches!(*proto, "http" | "https"))
            .unwrap_or("http");

        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|host| is_valid_host(host))
            .unwrap_or(self.fallback_host.as_str());

        format!("{scheme}://{host}")
    }
}

/// Accept only characters that can appear in a host[:port] authority.
fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b':' | b'[' | b']'))
}
