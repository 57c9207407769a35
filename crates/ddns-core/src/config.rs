//! Configuration for the DDNS updater
//!
//! All configuration comes from environment variables and is read once at
//! startup. [`ZoneConfig::from_lookup`] takes the variable source as a
//! closure so parsing can be exercised without touching the process
//! environment.

use std::fmt;
use std::time::Duration;

/// Cloudflare API token
pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
/// Target zone identifier
pub const ENV_ZONE_ID: &str = "CLOUDFLARE_ZONE_ID";
/// Fully-qualified record name to maintain
pub const ENV_RECORD_NAME: &str = "CLOUDFLARE_DNS_RECORD_NAME";
/// Record type (e.g. `A`)
pub const ENV_RECORD_TYPE: &str = "CLOUDFLARE_DNS_RECORD_TYPE";
/// Poll interval in minutes
pub const ENV_INTERVAL: &str = "INTERVAL";
/// Optional override of the public IP echo service
pub const ENV_IP_SERVICE_URL: &str = "IP_SERVICE_URL";
/// Optional run mode; `dry-run` disables directory writes
pub const ENV_MODE: &str = "DDNS_MODE";

/// Default public IP echo service
pub const DEFAULT_IP_SERVICE_URL: &str = "https://api.ipify.org";

/// Static zone configuration, immutable for the process lifetime
#[derive(Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Zone the record lives in
    pub zone_id: String,

    /// Fully-qualified record name (e.g. "home.example.com")
    pub record_name: String,

    /// Record type (e.g. "A")
    pub record_type: String,

    /// Poll interval in minutes (always > 0 once validated)
    pub interval_minutes: u64,

    /// Public IP echo endpoint
    pub ip_service_url: String,

    /// Log intended writes instead of performing them
    pub dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for ZoneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_name", &self.record_name)
            .field("record_type", &self.record_type)
            .field("interval_minutes", &self.interval_minutes)
            .field("ip_service_url", &self.ip_service_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl ZoneConfig {
    /// Create a configuration with the default IP service and live mode
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_name: impl Into<String>,
        record_type: impl Into<String>,
        interval_minutes: u64,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            record_name: record_name.into(),
            record_type: record_type.into(),
            interval_minutes,
            ip_service_url: DEFAULT_IP_SERVICE_URL.to_string(),
            dry_run: false,
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// The returned configuration has already passed [`ZoneConfig::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_raw = lookup(ENV_INTERVAL).unwrap_or_default();
        let interval_minutes = parse_interval(&interval_raw)?;

        let config = Self {
            api_token: lookup(ENV_API_TOKEN).unwrap_or_default(),
            zone_id: lookup(ENV_ZONE_ID).unwrap_or_default(),
            record_name: lookup(ENV_RECORD_NAME).unwrap_or_default(),
            record_type: lookup(ENV_RECORD_TYPE).unwrap_or_default(),
            interval_minutes,
            ip_service_url: lookup(ENV_IP_SERVICE_URL)
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IP_SERVICE_URL.to_string()),
            dry_run: lookup(ENV_MODE)
                .map(|mode| mode.trim().eq_ignore_ascii_case("dry-run"))
                .unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let required = [
            (ENV_API_TOKEN, &self.api_token),
            (ENV_ZONE_ID, &self.zone_id),
            (ENV_RECORD_NAME, &self.record_name),
            (ENV_RECORD_TYPE, &self.record_type),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(crate::Error::config(format!(
                "{} must be set",
                missing.join(", ")
            )));
        }

        if self.interval_minutes == 0 {
            return Err(crate::Error::config(format!(
                "{} must be a positive number of minutes",
                ENV_INTERVAL
            )));
        }

        if !self.ip_service_url.starts_with("https://")
            && !self.ip_service_url.starts_with("http://")
        {
            return Err(crate::Error::config(format!(
                "{} must use HTTP or HTTPS scheme. Got: {}",
                ENV_IP_SERVICE_URL, self.ip_service_url
            )));
        }

        Ok(())
    }

    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

fn parse_interval(raw: &str) -> Result<u64, crate::Error> {
    let minutes: i64 = raw.trim().parse().map_err(|_| {
        crate::Error::config(format!(
            "Can't read {} from the environment (got {:?})",
            ENV_INTERVAL, raw
        ))
    })?;

    if minutes <= 0 {
        return Err(crate::Error::config(format!(
            "{} must be a positive number of minutes. Got: {}",
            ENV_INTERVAL, minutes
        )));
    }

    Ok(minutes as u64)
}
