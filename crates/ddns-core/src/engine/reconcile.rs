//! Update decision loop
//!
//! Given a freshly resolved IP and the last applied one, decide whether the
//! record needs touching and, if so, find-or-create-or-update it.
//!
//! ```text
//! new == previous ──► Unchanged (no directory calls)
//!        │
//!        ▼
//!   list(zone, type) ──► first (type, name) match?
//!        │                   │
//!        ▼ no                ▼ yes
//!     create              update(id)
//! ```

use crate::config::ZoneConfig;
use crate::error::Result;
use crate::traits::{RecordDirectory, RecordParams};
use tracing::{debug, info, warn};

/// What a reconciliation did to the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// IP unchanged since the last successful cycle; nothing was called
    Unchanged,

    /// No matching record existed, one was created
    Created {
        /// ID assigned by the provider
        record_id: String,
    },

    /// The first matching record was updated in place
    Updated {
        /// ID of the mutated record
        record_id: String,
        /// Content the record held before the update
        previous_content: String,
    },
}

/// Result of one successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Directory action taken
    pub action: UpdateAction,

    /// Value to feed into the next cycle as the previous IP
    pub last_applied: String,
}

/// Reconcile the configured record with `new_ip`
///
/// `previous_ip` is the value returned by the previous successful call
/// (`None` when unknown, e.g. right after startup). Comparison is an exact
/// string match.
///
/// Any directory error is returned untouched; no further calls are made after
/// a failure.
pub async fn reconcile(
    directory: &dyn RecordDirectory,
    config: &ZoneConfig,
    new_ip: &str,
    previous_ip: Option<&str>,
) -> Result<Reconciliation> {
    if previous_ip == Some(new_ip) {
        info!("IP address has not changed ({}), skipping update", new_ip);
        return Ok(Reconciliation {
            action: UpdateAction::Unchanged,
            last_applied: new_ip.to_string(),
        });
    }

    let records = directory
        .list(&config.zone_id, Some(config.record_type.as_str()))
        .await?;

    let mut matching = records
        .iter()
        .filter(|record| record.matches(&config.record_type, &config.record_name));
    let existing = matching.next();

    let duplicates = matching.count();
    if duplicates > 0 {
        warn!(
            "{} additional {} records named {} found in zone; only the first is managed",
            duplicates, config.record_type, config.record_name
        );
    }

    let params = RecordParams::new(&config.record_type, &config.record_name, new_ip);

    let action = match existing {
        None => {
            info!(
                "DNS record {} ({}) does not exist, creating with {}",
                config.record_name, config.record_type, new_ip
            );
            let created = directory.create(&config.zone_id, &params).await?;
            info!("DNS record {} created (id: {})", config.record_name, created.id);
            UpdateAction::Created {
                record_id: created.id,
            }
        }
        Some(record) => {
            info!(
                "DNS record {} found, updating from {} to {}",
                config.record_name,
                previous_ip.unwrap_or("<unknown>"),
                new_ip
            );
            debug!("Updating record id {} (content: {})", record.id, record.content);
            directory
                .update(&config.zone_id, &record.id, &params)
                .await?;
            info!("DNS record {} updated", config.record_name);
            UpdateAction::Updated {
                record_id: record.id.clone(),
                previous_content: record.content.clone(),
            }
        }
    };

    Ok(Reconciliation {
        action,
        last_applied: new_ip.to_string(),
    })
}
