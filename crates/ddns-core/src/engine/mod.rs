//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the public IP on a fixed interval via IpResolver
//! - Running the update decision loop against a RecordDirectory
//! - Threading the last applied IP from one cycle into the next
//! - Deciding policy on failures (skip vs. stop)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  interval   │─── tick ───┐
//! └─────────────┘            │
//!                            ▼
//!                   ┌──────────────┐        ┌─────────────┐
//!                   │  DdnsEngine  │◄──────►│ IpResolver  │
//!                   └──────────────┘        └─────────────┘
//!                            │
//!              ┌─────────────┴─────────────┐
//!              ▼                           ▼
//!     ┌─────────────────┐          ┌─────────────┐
//!     │ reconcile()     │─────────►│  Directory  │
//!     │ (decision loop) │          │ list/create │
//!     └─────────────────┘          │ /update     │
//!                                  └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Tick fires (the first one immediately)
//! 2. Resolve the public IP; on failure log, skip, keep state
//! 3. Reconcile against the previous IP
//! 4. Carry the returned IP into the next cycle
//! 5. Directory failures stop the engine with an error

pub mod reconcile;

pub use reconcile::{Reconciliation, UpdateAction, reconcile};

use crate::config::ZoneConfig;
use crate::error::Result;
use crate::traits::{IpResolver, RecordDirectory};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

/// Capacity of the engine event channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        record_name: String,
        interval_minutes: u64,
    },

    /// Public IP resolved for this cycle
    IpResolved { ip: String },

    /// Public IP lookup failed, cycle skipped
    ResolutionFailed { error: String },

    /// IP unchanged, no directory calls made
    UpdateSkipped {
        record_name: String,
        current_ip: String,
    },

    /// Record did not exist and was created
    RecordCreated {
        record_name: String,
        record_id: String,
        new_ip: String,
    },

    /// Existing record was updated
    RecordUpdated {
        record_name: String,
        record_id: String,
        previous_ip: Option<String>,
        new_ip: String,
    },

    /// Engine stopped
    Stopped { reason: String },
}

/// Outcome of a single scheduler tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The IP lookup failed; the directory was not consulted
    ResolutionFailed {
        /// Previous value, unchanged
        last_applied: Option<String>,
        /// Lookup error message
        error: String,
    },

    /// The decision loop ran to completion
    Reconciled(Reconciliation),
}

impl CycleOutcome {
    /// The last applied IP to carry into the next cycle
    pub fn last_applied(&self) -> Option<&str> {
        match self {
            CycleOutcome::ResolutionFailed { last_applied, .. } => last_applied.as_deref(),
            CycleOutcome::Reconciled(r) => Some(r.last_applied.as_str()),
        }
    }

    /// Consume the outcome, keeping only the carried IP
    pub fn into_last_applied(self) -> Option<String> {
        match self {
            CycleOutcome::ResolutionFailed { last_applied, .. } => last_applied,
            CycleOutcome::Reconciled(r) => Some(r.last_applied),
        }
    }
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run_with_shutdown()`]
/// 3. Engine runs until a shutdown signal or a directory failure
///
/// ## Threading
///
/// Cycles run one at a time on the calling task; a slow cycle delays the
/// next tick rather than overlapping with it.
pub struct DdnsEngine {
    /// Public IP resolver
    resolver: Box<dyn IpResolver>,

    /// DNS provider record directory
    directory: Box<dyn RecordDirectory>,

    /// Immutable zone configuration
    config: ZoneConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        resolver: Box<dyn IpResolver>,
        directory: Box<dyn RecordDirectory>,
        config: ZoneConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            resolver,
            directory,
            config,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// The caller owns OS signal handling.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: A non-transient failure ended the loop
    pub async fn run_with_shutdown(&self, mut shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        info!(
            "Managing {} record {} in zone {} every {} minute(s) via {}",
            self.config.record_type,
            self.config.record_name,
            self.config.zone_id,
            self.config.interval_minutes,
            self.directory.provider_name()
        );
        self.emit_event(EngineEvent::Started {
            record_name: self.config.record_name.clone(),
            interval_minutes: self.config.interval_minutes,
        });

        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);

        let mut last_applied: Option<String> = None;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    return Ok(());
                }

                Some(_) = ticks.next() => {
                    match self.run_cycle(last_applied.take()).await {
                        Ok(outcome) => {
                            last_applied = outcome.into_last_applied();
                        }
                        Err(e) => {
                            error!("Fatal error managing DNS record {}: {}", self.config.record_name, e);
                            self.emit_event(EngineEvent::Stopped {
                                reason: e.to_string(),
                            });
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Run one scheduler tick
    ///
    /// A transient lookup failure is logged and reported as
    /// [`CycleOutcome::ResolutionFailed`] with `previous` carried through.
    /// Every other failure is returned as `Err` and is fatal to
    /// [`DdnsEngine::run_with_shutdown`].
    pub async fn run_cycle(&self, previous: Option<String>) -> Result<CycleOutcome> {
        let new_ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) if e.is_transient() => {
                warn!("Error getting public IP from {}: {}", self.resolver.describe(), e);
                self.emit_event(EngineEvent::ResolutionFailed {
                    error: e.to_string(),
                });
                return Ok(CycleOutcome::ResolutionFailed {
                    last_applied: previous,
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        debug!("Resolved public IP: {}", new_ip);
        self.emit_event(EngineEvent::IpResolved { ip: new_ip.clone() });

        let result = reconcile(
            self.directory.as_ref(),
            &self.config,
            &new_ip,
            previous.as_deref(),
        )
        .await?;

        let record_name = self.config.record_name.clone();
        match &result.action {
            UpdateAction::Unchanged => self.emit_event(EngineEvent::UpdateSkipped {
                record_name,
                current_ip: new_ip,
            }),
            UpdateAction::Created { record_id } => self.emit_event(EngineEvent::RecordCreated {
                record_name,
                record_id: record_id.clone(),
                new_ip,
            }),
            UpdateAction::Updated { record_id, .. } => {
                self.emit_event(EngineEvent::RecordUpdated {
                    record_name,
                    record_id: record_id.clone(),
                    previous_ip: previous,
                    new_ip,
                })
            }
        }

        Ok(CycleOutcome::Reconciled(result))
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // A full or closed channel must never stall a cycle
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping event");
        }
    }
}
