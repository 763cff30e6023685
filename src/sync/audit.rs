//! Audit log: one append-only row per symbol per sync attempt

use crate::store::{append_rows, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Audit log file name under the log directory
pub const AUDIT_LOG_FILE: &str = "data_updates.csv";

/// Lifecycle status of a sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Started,
    Success,
    Error,
}

/// One sync attempt for one symbol. Rows are never mutated or deleted
/// once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub run_ts: DateTime<Utc>,
    pub symbol: String,
    pub had_existing_store: bool,
    pub last_ts_before: Option<DateTime<Utc>>,
    pub requested_start: Option<DateTime<Utc>>,
    pub requested_end: Option<DateTime<Utc>>,
    pub rows_fetched: usize,
    pub rows_after_merge: usize,
    pub status: AuditStatus,
    pub message: String,
}

impl AuditRecord {
    /// Fresh record for an attempt that has not yet fetched anything
    pub fn started(run_ts: DateTime<Utc>, symbol: &str) -> Self {
        Self {
            run_ts,
            symbol: symbol.to_string(),
            had_existing_store: false,
            last_ts_before: None,
            requested_start: None,
            requested_end: None,
            rows_fetched: 0,
            rows_after_merge: 0,
            status: AuditStatus::Started,
            message: String::new(),
        }
    }
}

/// Append-only audit log, one shared CSV per process
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Create a log writing to `{log_dir}/data_updates.csv`
    pub fn new(log_dir: impl AsRef<Path>) -> Self {
        Self {
            path: log_dir.as_ref().join(AUDIT_LOG_FILE),
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header on first use
    pub fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        append_rows(&self.path, std::iter::once(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read_back(log: &AuditLog) -> Vec<AuditRecord> {
        let mut reader = csv::Reader::from_path(log.path()).unwrap();
        reader.deserialize().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        let mut record = AuditRecord::started(Utc::now(), "SPY");
        record.status = AuditStatus::Success;
        log.append(&record).unwrap();
        log.append(&record).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "run_ts,symbol,had_existing_store,last_ts_before,requested_start,\
             requested_end,rows_fetched,rows_after_merge,status,message"
        );
    }

    #[test]
    fn test_record_roundtrip() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        let mut record = AuditRecord::started(Utc::now(), "QQQ");
        record.had_existing_store = true;
        record.rows_fetched = 5;
        record.rows_after_merge = 125;
        record.status = AuditStatus::Error;
        record.message = "data source api error: 403 - forbidden".to_string();
        log.append(&record).unwrap();

        let rows = read_back(&log);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "QQQ");
        assert_eq!(rows[0].status, AuditStatus::Error);
        assert_eq!(rows[0].rows_after_merge, 125);
        assert_eq!(rows[0].last_ts_before, None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        let mut record = AuditRecord::started(Utc::now(), "SPY");
        record.status = AuditStatus::Success;
        log.append(&record).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains(",success,"));
    }
}
