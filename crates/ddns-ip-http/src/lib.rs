// # HTTP IP Resolver
//
// This crate provides the public IP resolver for the DDNS updater.
//
// ## Architecture
//
// Issues one GET to an IP echo service (api.ipify.org by default) per call
// and returns the trimmed plain-text body. The body is not parsed as an IP
// address; it is compared verbatim against the last applied value.

use ddns_core::traits::IpResolver;
use ddns_core::{Error, Result};

use std::time::Duration;

/// Default HTTP timeout for IP lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP resolver
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// URL to fetch the IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver for `url` (e.g. "https://api.ipify.org")
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// The endpoint this resolver queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("failed to get public IP: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ip_source(format!(
                "failed to get public IP: HTTP status {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("failed to read IP from response: {}", e)))?;

        let ip = body.trim();
        if ip.is_empty() {
            return Err(Error::ip_source("IP service returned an empty body"));
        }

        tracing::debug!("{} reported public IP {}", self.url, ip);
        Ok(ip.to_string())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
