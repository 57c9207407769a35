//! Core traits for the DDNS updater
//!
//! This module defines the interfaces the scheduler drives.
//!
//! - [`IpResolver`]: Discover the current public IP
//! - [`RecordDirectory`]: List, create and update records in a zone

pub mod ip_resolver;
pub mod record_directory;

pub use ip_resolver::IpResolver;
pub use record_directory::{DnsRecord, RecordDirectory, RecordParams};
