// src/service/storage.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::core::errors::AuditError;
use crate::core::models::{AuditReport, AuditResponse};
use crate::core::validator::validate;

pub const REPORT_PREFIX: &str = "scan_reports";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Object store that audit reports are written to.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Stores `contents` under `key`, replacing any existing object.
    async fn put_object(&self, key: &str, contents: Vec<u8>) -> Result<(), StoreError>;
}

/// Object store backed by a directory; keys map to relative paths under `root`.
#[derive(Debug, Clone)]
pub struct LocalReportStore {
    root: PathBuf,
}

impl LocalReportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ReportStore for LocalReportStore {
    async fn put_object(&self, key: &str, contents: Vec<u8>) -> Result<(), StoreError> {
        let path = self.root.join(key);
        let io_err = |source| StoreError::Io { key: key.to_string(), source };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&path, contents).await.map_err(io_err)?;
        debug!(path = %path.display(), "Object written.");
        Ok(())
    }
}

/// Object key for a result: `scan_reports/<timestamp>_<host>.json`.
///
/// The timestamp carries microseconds so that two audits of the same host
/// in the same second land on different objects. Unparseable URLs use the
/// host `unknown`.
pub fn object_key(url: &str, scanned_at: DateTime<Utc>) -> String {
    let host = validate(url)
        .map(|target| target.host().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!(
        "{}/{}_{}.json",
        REPORT_PREFIX,
        scanned_at.format("%Y-%m-%dT%H-%M-%S%.6f"),
        host
    )
}

pub fn report_key(report: &AuditReport) -> String {
    object_key(&report.url, report.scanned_at)
}

async fn put_json<T: Serialize + Sync>(store: &dyn ReportStore, key: &str, value: &T) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(value)?;
    store.put_object(key, body).await.map_err(|e| {
        error!(key = %key, error = %e, "Failed to persist audit result.");
        e
    })
}

/// Writes `report` as indented JSON and returns it with `report_path` set.
pub async fn persist_report(store: &dyn ReportStore, mut report: AuditReport) -> Result<AuditReport, StoreError> {
    let key = report_key(&report);
    put_json(store, &key, &report).await?;

    info!(key = %key, "Report persisted.");
    report.report_path = Some(key);
    Ok(report)
}

/// Writes the `{"error": ...}` object for an audit of `url` that produced no
/// report, stamped now. Returns the key it was written under.
pub async fn persist_error(store: &dyn ReportStore, url: &str, error: &AuditError) -> Result<String, StoreError> {
    let key = object_key(url, Utc::now());
    put_json(store, &key, &AuditResponse::Error { error: error.clone() }).await?;

    info!(key = %key, error = %error, "Audit error persisted.");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::HeaderProbeError;
    use crate::core::models::HeaderFindings;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn report(url: &str) -> AuditReport {
        AuditReport {
            url: url.to_string(),
            scanned_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            https: true,
            headers: HeaderFindings::Failed { error: HeaderProbeError::Timeout },
            open_ports: vec![443],
            cloud_storage_exposure: false,
            report_path: None,
        }
    }

    #[test]
    fn key_combines_timestamp_and_host() {
        assert_eq!(
            report_key(&report("https://example.com:8443/login")),
            "scan_reports/2026-03-14T09-26-53.000000_example.com:8443.json"
        );
    }

    #[tokio::test]
    async fn same_second_reports_do_not_overwrite_each_other() {
        let dir = TempDir::new().unwrap();
        let store = LocalReportStore::new(dir.path());
        let second = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();

        let mut early = report("https://example.com");
        early.scanned_at = second + chrono::Duration::milliseconds(100);
        early.open_ports = vec![80];
        let mut late = report("https://example.com");
        late.scanned_at = second + chrono::Duration::milliseconds(900);
        late.open_ports = vec![443];

        let early = persist_report(&store, early).await.unwrap();
        let late = persist_report(&store, late).await.unwrap();

        let early_key = early.report_path.unwrap();
        assert_eq!(early_key, "scan_reports/2026-03-14T09-26-53.100000_example.com.json");
        assert_ne!(Some(early_key.clone()), late.report_path);
        let text = std::fs::read_to_string(dir.path().join(&early_key)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["open_ports"], serde_json::json!([80]));
    }

    #[tokio::test]
    async fn error_result_is_stored_under_unknown_host() {
        let dir = TempDir::new().unwrap();
        let store = LocalReportStore::new(dir.path());
        let error = AuditError::from(crate::core::errors::ValidationError::MalformedUrl);

        let key = persist_error(&store, "not a url", &error).await.unwrap();

        assert!(key.starts_with("scan_reports/"));
        assert!(key.ends_with("_unknown.json"));
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(&key)).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "Invalid URL format" }));
    }

    #[tokio::test]
    async fn persisted_report_is_indented_json_with_path() {
        let dir = TempDir::new().unwrap();
        let store = LocalReportStore::new(dir.path());

        let saved = persist_report(&store, report("https://example.com")).await.unwrap();

        let key = saved.report_path.clone().unwrap();
        assert_eq!(key, "scan_reports/2026-03-14T09-26-53.000000_example.com.json");
        let text = std::fs::read_to_string(dir.path().join(&key)).unwrap();
        assert!(text.contains("\n  \"url\": \"https://example.com\""));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["open_ports"], serde_json::json!([443]));
    }

    #[tokio::test]
    async fn unwritable_root_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let store = LocalReportStore::new(&blocker);

        let err = persist_report(&store, report("https://example.com")).await.unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
    }
}
