// # ddns-core
//
// Core library for the Cloudflare dynamic DNS updater.
//
// ## Architecture Overview
//
// - **IpResolver**: Trait for discovering the current public IP
// - **RecordDirectory**: Trait for listing, creating and updating zone records
// - **reconcile**: The update decision loop (compare, find-or-create-or-update)
// - **DdnsEngine**: Fixed-interval scheduler driving the decision loop
// - **ZoneConfig**: Immutable configuration read from the environment
//
// ## Design Principles
//
// 1. **Explicit state**: The last applied IP is a value passed from one cycle
//    to the next, never a shared variable
// 2. **Errors as values**: The decision loop returns errors; the scheduler and
//    daemon decide whether to skip or stop
// 3. **Library-First**: Everything except process setup lives here

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpResolver, RecordDirectory, DnsRecord, RecordParams};
pub use engine::{DdnsEngine, EngineEvent, CycleOutcome, Reconciliation, UpdateAction, reconcile};
pub use config::ZoneConfig;
pub use error::{Error, Result};
