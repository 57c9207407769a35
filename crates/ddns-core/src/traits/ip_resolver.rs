// # IP Resolver Trait
//
// Defines the interface for discovering the caller's current public address.
//
// ## Implementations
//
// - HTTP echo service: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//
//     let ip = resolver.resolve().await?;
//     println!("public address: {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for public IP resolver implementations
///
/// A resolver performs exactly one lookup per call and returns the address
/// as text. The value is compared verbatim against the last applied address,
/// so implementations should return it trimmed but otherwise untouched.
///
/// # Responsibilities
///
/// - ✅ One outbound request per [`IpResolver::resolve`] call
/// - ❌ No caching between calls (the scheduler owns last-known state)
/// - ❌ No retry logic (a failed lookup just skips the cycle)
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The trimmed, non-empty address text
    /// - `Err(Error::IpSource)`: If the lookup failed for any reason
    async fn resolve(&self) -> Result<String, crate::Error>;

    /// Endpoint or mechanism description (for logging)
    fn describe(&self) -> String;
}
