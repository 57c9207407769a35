// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare v4 record directory for the DDNS updater.
//
// ## Behaviour
//
// - ✅ One HTTP request per directory operation (list follows pagination)
// - ✅ Full error propagation (the scheduler treats directory errors as fatal)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - ✅ Envelope `success: false` surfaced with Cloudflare's error messages
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry or backoff logic
// - ❌ NO caching between calls
//
// ## Security Requirements
//
// - API token NEVER appears in logs, errors or Debug output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&page=...&per_page=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::traits::{DnsRecord, RecordDirectory, RecordParams};
use ddns_core::{Error, Result, ZoneConfig};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size used when listing records
const LIST_PAGE_SIZE: u32 = 100;

const PROVIDER: &str = "cloudflare";

/// Standard Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct CloudflareEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct CloudflareMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

/// Cloudflare DNS record directory
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the directory will:
/// - Perform list requests
/// - Log the intended create/update payload
/// - **NOT** actually modify DNS records
pub struct CloudflareDirectory {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, list normally but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareDirectory")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareDirectory {
    /// Create a new Cloudflare directory
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `dry_run`: If true, list records but skip create/update
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token is empty or the HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to initialize Cloudflare API client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a new Cloudflare directory (production/live mode)
    pub fn new_live(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, false)
    }

    /// Create a new Cloudflare directory (dry-run mode)
    pub fn new_dry_run(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, true)
    }

    /// Create a directory from the zone configuration
    pub fn from_config(config: &ZoneConfig) -> Result<Self> {
        if config.dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }
        Self::new(config.api_token.clone(), config.dry_run)
    }

    /// Point the directory at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    /// Send an authenticated request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<CloudflareEnvelope<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("{}: HTTP request failed: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, &body, action));
        }

        let body = response.text().await.map_err(|e| {
            Error::provider(PROVIDER, format!("{}: failed to read response: {}", action, e))
        })?;

        let envelope: CloudflareEnvelope<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(Error::provider(
                PROVIDER,
                format!("{} failed: {}", action, describe_errors(&envelope.errors)),
            ));
        }

        Ok(envelope)
    }

    async fn write(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<DnsRecord> {
        let envelope: CloudflareEnvelope<DnsRecord> = self.send(request, action).await?;
        envelope.result.ok_or_else(|| {
            Error::provider(PROVIDER, format!("{}: response has no result", action))
        })
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: reqwest::StatusCode, body: &str, action: &str) -> Error {
    // Prefer Cloudflare's structured messages over the raw body
    let detail = serde_json::from_str::<CloudflareEnvelope<serde_json::Value>>(body)
        .ok()
        .filter(|envelope| !envelope.errors.is_empty())
        .map(|envelope| describe_errors(&envelope.errors))
        .unwrap_or_else(|| body.to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid API token or insufficient permissions. Status: {} - {}",
            action, status, detail
        )),
        404 => Error::not_found(format!("{}: {} - {}", action, status, detail)),
        409 => Error::provider(
            PROVIDER,
            format!("{}: conflict. Status: {} - {}", action, status, detail),
        ),
        429 => Error::rate_limited(format!("{}: Status: {} - {}", action, status, detail)),
        500..=599 => Error::provider(
            PROVIDER,
            format!("{}: Cloudflare server error: {} - {}", action, status, detail),
        ),
        _ => Error::provider(PROVIDER, format!("{} failed: {} - {}", action, status, detail)),
    }
}

fn describe_errors(errors: &[CloudflareMessage]) -> String {
    if errors.is_empty() {
        return "unknown error".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl RecordDirectory for CloudflareDirectory {
    /// List records, following pagination so the full set is returned in
    /// provider order.
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&per_page=100&page=1
    /// Authorization: Bearer <token>
    /// ```
    async fn list(&self, zone_id: &str, record_type: Option<&str>) -> Result<Vec<DnsRecord>> {
        let url = self.records_url(zone_id);
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut query = vec![
                ("per_page", LIST_PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            if let Some(record_type) = record_type {
                query.push(("type", record_type.to_string()));
            }

            tracing::debug!("Listing DNS records in zone {} (page {})", zone_id, page);

            let envelope: CloudflareEnvelope<Vec<DnsRecord>> = self
                .send(self.client.get(&url).query(&query), "List DNS records")
                .await?;

            let batch = envelope.result.unwrap_or_default();
            let total_pages = envelope.result_info.map(|info| info.total_pages).unwrap_or(1);
            let exhausted = batch.is_empty() || page >= total_pages;
            records.extend(batch);

            if exhausted {
                break;
            }
            page += 1;
        }

        tracing::debug!("Found {} DNS record(s) in zone {}", records.len(), zone_id);
        Ok(records)
    }

    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// { "type": "A", "name": "home.example.com", "content": "203.0.113.5" }
    /// ```
    async fn create(&self, zone_id: &str, params: &RecordParams) -> Result<DnsRecord> {
        let url = self.records_url(zone_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                url,
                serde_json::to_string(params)?
            );
            return Ok(DnsRecord {
                id: "dry-run".to_string(),
                record_type: params.record_type.clone(),
                name: params.name.clone(),
                content: params.content.clone(),
            });
        }

        self.write(self.client.post(&url).json(params), "Create DNS record")
            .await
    }

    /// PATCH keeps TTL and proxy settings of the existing record.
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "home.example.com", "content": "203.0.113.9" }
    /// ```
    async fn update(
        &self,
        zone_id: &str,
        record_id: &str,
        params: &RecordParams,
    ) -> Result<DnsRecord> {
        let url = format!("{}/{}", self.records_url(zone_id), record_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                url,
                serde_json::to_string(params)?
            );
            return Ok(DnsRecord {
                id: record_id.to_string(),
                record_type: params.record_type.clone(),
                name: params.name.clone(),
                content: params.content.clone(),
            });
        }

        self.write(self.client.patch(&url).json(params), "Update DNS record")
            .await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
