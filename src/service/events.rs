// src/service/events.rs

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::core::models::{AuditOutcome, AuditRequest};
use crate::core::scanner::Auditor;
use crate::service::bus::PushMessage;
use crate::service::storage::{persist_error, persist_report, report_key, ReportStore, StoreError};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("message data is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("message data is not a JSON audit request: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("message carries no url")]
    MissingUrl,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one event left in the object store.
#[derive(Debug, Clone)]
pub struct StoredResult {
    pub key: String,
    pub outcome: AuditOutcome,
}

/// Event-triggered entry point: one push message in, one stored result out.
#[derive(Clone)]
pub struct EventHandler {
    auditor: Auditor,
    store: Arc<dyn ReportStore>,
}

impl EventHandler {
    pub fn new(auditor: Auditor, store: Arc<dyn ReportStore>) -> Self {
        Self { auditor, store }
    }

    /// Decodes the message, audits its `url` and stores whatever the audit
    /// returned: the report, or the `{"error": ...}` object.
    pub async fn process(&self, message: &PushMessage) -> Result<StoredResult, EventError> {
        let payload = message.decode_data()?;
        let request: AuditRequest = serde_json::from_slice(&payload)?;
        let url = request.url.trim();
        if url.is_empty() {
            return Err(EventError::MissingUrl);
        }

        info!(message_id = %message.message_id, url, "Processing audit event.");
        match self.auditor.perform_full_audit(url).await {
            Ok(report) => {
                let report = persist_report(self.store.as_ref(), report).await?;
                let key = report_key(&report);
                Ok(StoredResult { key, outcome: Ok(report) })
            }
            Err(error) => {
                let key = persist_error(self.store.as_ref(), url, &error).await?;
                Ok(StoredResult { key, outcome: Err(error) })
            }
        }
    }

    /// Like [`EventHandler::process`], but logs and swallows decode, parse
    /// and store failures. There is no retry and no dead-letter.
    pub async fn handle(&self, message: &PushMessage) {
        match self.process(message).await {
            Ok(StoredResult { key, outcome: Ok(_) }) => {
                info!(message_id = %message.message_id, key = %key, "Audit event completed.")
            }
            Ok(StoredResult { key, outcome: Err(e) }) => {
                warn!(message_id = %message.message_id, key = %key, error = %e, "Audit event stored an error result.")
            }
            Err(e) => error!(message_id = %message.message_id, error = %e, "Audit event failed."),
        }
    }

    /// Consumes messages from `rx` until the topic closes. Each message is
    /// handled on its own task so a slow audit doesn't hold up the queue.
    pub fn spawn_worker(self, mut rx: broadcast::Receiver<PushMessage>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Audit event worker started.");
            loop {
                match rx.recv().await {
                    Ok(message) => {
                        let handler = self.clone();
                        tokio::spawn(async move { handler.handle(&message).await });
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Audit event worker fell behind, messages dropped.");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            info!("Audit event worker stopped.");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use crate::core::errors::{AuditError, ValidationError};
    use crate::service::storage::LocalReportStore;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    fn handler(dir: &TempDir, ports: Vec<u16>) -> EventHandler {
        let auditor = Auditor::new(
            AuditConfig::default()
                .with_ports(ports)
                .with_header_timeout(Duration::from_millis(500))
                .with_port_timeout(Duration::from_millis(300)),
        );
        EventHandler::new(auditor, Arc::new(LocalReportStore::new(dir.path())))
    }

    #[tokio::test]
    async fn valid_event_is_audited_and_stored() {
        let dir = TempDir::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let message = PushMessage::from_bytes(format!(r#"{{"url": "http://127.0.0.1:{port}/"}}"#).as_bytes());

        let stored = handler(&dir, vec![port]).process(&message).await.unwrap();

        let report = stored.outcome.unwrap();
        assert_eq!(report.open_ports, vec![port]);
        assert_eq!(report.report_path.as_deref(), Some(stored.key.as_str()));
        assert!(dir.path().join(&stored.key).exists());
    }

    #[tokio::test]
    async fn garbage_data_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let message = PushMessage { data: "***".to_string(), ..PushMessage::from_bytes(b"") };

        let err = handler(&dir, vec![]).process(&message).await.unwrap_err();

        assert!(matches!(err, EventError::Decode(_)));
    }

    #[tokio::test]
    async fn non_json_payload_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let message = PushMessage::from_bytes(b"https://example.com");

        let err = handler(&dir, vec![]).process(&message).await.unwrap_err();

        assert!(matches!(err, EventError::Parse(_)));
    }

    #[tokio::test]
    async fn missing_url_is_rejected_without_auditing() {
        let dir = TempDir::new().unwrap();
        let message = PushMessage::from_bytes(br#"{"target": "https://example.com"}"#);

        let err = handler(&dir, vec![]).process(&message).await.unwrap_err();

        assert!(matches!(err, EventError::MissingUrl));
    }

    #[tokio::test]
    async fn invalid_url_stores_the_error_object() {
        let dir = TempDir::new().unwrap();
        let message = PushMessage::from_bytes(br#"{"url": "not a url"}"#);

        let stored = handler(&dir, vec![]).process(&message).await.unwrap();

        assert_eq!(stored.outcome, Err(AuditError::Invalid(ValidationError::MalformedUrl)));
        assert!(stored.key.ends_with("_unknown.json"));
        let body: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(&stored.key)).unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid URL format" }));
    }

    #[tokio::test]
    async fn store_failure_is_an_event_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let handler = EventHandler::new(Auditor::default(), Arc::new(LocalReportStore::new(&blocker)));
        let message = PushMessage::from_bytes(br#"{"url": "not a url"}"#);
        let err = handler.process(&message).await.unwrap_err();

        assert!(matches!(err, EventError::Store(_)));
    }

    #[tokio::test]
    async fn handle_swallows_unreadable_messages() {
        let dir = TempDir::new().unwrap();
        let message = PushMessage::from_bytes(b"{}");

        handler(&dir, vec![]).handle(&message).await;

        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn handle_still_stores_audit_errors() {
        let dir = TempDir::new().unwrap();
        let message = PushMessage::from_bytes(br#"{"url": "file:///etc/hosts"}"#);

        handler(&dir, vec![]).handle(&message).await;

        let stored: Vec<_> = std::fs::read_dir(dir.path().join("scan_reports")).unwrap().collect();
        assert_eq!(stored.len(), 1);
    }
}
