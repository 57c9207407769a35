// # Record Directory Trait
//
// Defines the zone-scoped record management interface of a DNS provider.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{RecordDirectory, RecordParams};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let directory = /* RecordDirectory implementation */;
//
//     let records = directory.list("zone123", Some("A")).await?;
//     if records.is_empty() {
//         directory
//             .create("zone123", &RecordParams::new("A", "home.example.com", "203.0.113.5"))
//             .await?;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A DNS record as stored by the provider
///
/// Field names follow the Cloudflare v4 wire format so the type can be
/// deserialized straight from API responses; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Opaque record ID, stable across updates
    pub id: String,

    /// Record type (e.g. "A")
    #[serde(rename = "type")]
    pub record_type: String,

    /// Fully-qualified record name
    pub name: String,

    /// Record value (the IP address for address records)
    pub content: String,
}

impl DnsRecord {
    /// Whether this record is the one identified by `(record_type, name)`
    pub fn matches(&self, record_type: &str, name: &str) -> bool {
        self.record_type == record_type && self.name == name
    }
}

/// Payload for creating or updating a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordParams {
    /// Record type (e.g. "A")
    #[serde(rename = "type")]
    pub record_type: String,

    /// Fully-qualified record name
    pub name: String,

    /// New record value
    pub content: String,
}

impl RecordParams {
    /// Create a new record payload
    pub fn new(
        record_type: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Trait for DNS provider record directories
///
/// # Responsibilities
///
/// - ✅ Perform one API operation per call (pagination of `list` excepted)
/// - ✅ Return records in provider order
/// - ❌ Decide whether an update is needed (owned by the decision loop)
/// - ❌ Retry or back off (a failure is returned and treated as fatal)
///
/// `list` must reflect prior writes (read-after-write consistency) and all
/// operations complete before returning.
#[async_trait]
pub trait RecordDirectory: Send + Sync {
    /// List the records of a zone
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Zone to list
    /// - `record_type`: Optional type filter (e.g. `Some("A")`)
    async fn list(
        &self,
        zone_id: &str,
        record_type: Option<&str>,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record in a zone
    async fn create(&self, zone_id: &str, params: &RecordParams)
        -> Result<DnsRecord, crate::Error>;

    /// Update an existing record in place
    ///
    /// The record keeps its ID.
    async fn update(
        &self,
        zone_id: &str,
        record_id: &str,
        params: &RecordParams,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
