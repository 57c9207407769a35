//! Test doubles and common utilities for engine contract tests
//!
//! The doubles record every call so tests can assert on exact directory
//! traffic without any network access.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsRecord, IpResolver, RecordDirectory, RecordParams};
use ddns_core::ZoneConfig;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A directory call as observed by [`RecordingDirectory`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    List {
        zone_id: String,
        record_type: Option<String>,
    },
    Create {
        zone_id: String,
        params: RecordParams,
    },
    Update {
        zone_id: String,
        record_id: String,
        params: RecordParams,
    },
}

/// An in-memory RecordDirectory that records calls
///
/// Writes are applied to the in-memory record set so `list` reflects them.
#[derive(Clone, Default)]
pub struct RecordingDirectory {
    records: Arc<Mutex<Vec<DnsRecord>>>,
    calls: Arc<Mutex<Vec<DirectoryCall>>>,
    next_id: Arc<AtomicUsize>,
    fail_list: bool,
    fail_writes: bool,
}

impl RecordingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given records, in provider order
    pub fn with_records(records: Vec<DnsRecord>) -> Self {
        let directory = Self::new();
        *directory.records.lock().unwrap() = records;
        directory
    }

    /// Make every list call fail
    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Make every create/update call fail
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_count(&self) -> usize {
        self.count(|c| matches!(c, DirectoryCall::List { .. }))
    }

    pub fn create_count(&self) -> usize {
        self.count(|c| matches!(c, DirectoryCall::Create { .. }))
    }

    pub fn update_count(&self) -> usize {
        self.count(|c| matches!(c, DirectoryCall::Update { .. }))
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&DirectoryCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait::async_trait]
impl RecordDirectory for RecordingDirectory {
    async fn list(&self, zone_id: &str, record_type: Option<&str>) -> Result<Vec<DnsRecord>> {
        self.calls.lock().unwrap().push(DirectoryCall::List {
            zone_id: zone_id.to_string(),
            record_type: record_type.map(str::to_string),
        });

        if self.fail_list {
            return Err(Error::provider("recording", "list failed"));
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| record_type.is_none_or(|t| r.record_type == t))
            .cloned()
            .collect())
    }

    async fn create(&self, zone_id: &str, params: &RecordParams) -> Result<DnsRecord> {
        self.calls.lock().unwrap().push(DirectoryCall::Create {
            zone_id: zone_id.to_string(),
            params: params.clone(),
        });

        if self.fail_writes {
            return Err(Error::provider("recording", "create failed"));
        }

        let id = format!("created-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = record(&id, &params.record_type, &params.name, &params.content);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        zone_id: &str,
        record_id: &str,
        params: &RecordParams,
    ) -> Result<DnsRecord> {
        self.calls.lock().unwrap().push(DirectoryCall::Update {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            params: params.clone(),
        });

        if self.fail_writes {
            return Err(Error::provider("recording", "update failed"));
        }

        let mut records = self.records.lock().unwrap();
        let existing = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::not_found(format!("record {}", record_id)))?;
        existing.record_type = params.record_type.clone();
        existing.name = params.name.clone();
        existing.content = params.content.clone();
        Ok(existing.clone())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// An IpResolver that replays a script of results, repeating the last one
#[derive(Clone)]
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    last: Arc<Mutex<std::result::Result<String, String>>>,
    call_count: Arc<AtomicUsize>,
    fatal: bool,
}

impl ScriptedResolver {
    pub fn new(script: Vec<std::result::Result<&str, &str>>) -> Self {
        let script: VecDeque<_> = script
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        let last = script
            .back()
            .cloned()
            .unwrap_or_else(|| Err("empty script".to_string()));

        Self {
            script: Arc::new(Mutex::new(script)),
            last: Arc::new(Mutex::new(last)),
            call_count: Arc::new(AtomicUsize::new(0)),
            fatal: false,
        }
    }

    /// Always resolve to `ip`
    pub fn fixed(ip: &str) -> Self {
        Self::new(vec![Ok(ip)])
    }

    /// Always fail
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(message)])
    }

    /// Report scripted failures as configuration errors instead of lookup errors
    pub fn with_fatal_errors(mut self) -> Self {
        self.fatal = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let result = match next {
            Some(r) => {
                *self.last.lock().unwrap() = r.clone();
                r
            }
            None => self.last.lock().unwrap().clone(),
        };
        if self.fatal {
            result.map_err(Error::config)
        } else {
            result.map_err(Error::ip_source)
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Build a record in Cloudflare shape
pub fn record(id: &str, record_type: &str, name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: record_type.to_string(),
        name: name.to_string(),
        content: content.to_string(),
    }
}

/// Minimal configuration for `home.example.com` / `A` in `zone123`
pub fn home_config() -> ZoneConfig {
    ZoneConfig::new("test-token", "zone123", "home.example.com", "A", 1)
}
