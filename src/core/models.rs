// src/core/models.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::{AuditError, HeaderProbeError};

// --- Input ---

/// Body accepted by the HTTP front door and carried on the requests topic.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditRequest {
    #[serde(default)]
    pub url: String,
}

/// Scheme and authority extracted from a validated URL.
///
/// Only `core::validator::validate` builds one, so `host` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget {
    pub(crate) scheme: String,
    pub(crate) host: String,
    pub(crate) hostname: String,
}

impl ParsedTarget {
    /// The scheme exactly as written in the input.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The authority exactly as written, port included when present.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Bare hostname or IP literal used as the socket address for port probes.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

// --- Probe results ---

/// Outcome of the header probe: the observed header map, or why it couldn't run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderFindings {
    Observed(BTreeMap<String, String>),
    Failed { error: HeaderProbeError },
}

impl HeaderFindings {
    /// Value recorded for `name`, `None` when the probe failed.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            HeaderFindings::Observed(map) => map.get(name).map(String::as_str),
            HeaderFindings::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&HeaderProbeError> {
        match self {
            HeaderFindings::Observed(_) => None,
            HeaderFindings::Failed { error } => Some(error),
        }
    }
}

// --- Report ---

/// Aggregate result of one audit. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub url: String,
    pub scanned_at: DateTime<Utc>,
    pub https: bool,
    pub headers: HeaderFindings,
    pub open_ports: Vec<u16>,
    pub cloud_storage_exposure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
}

pub type AuditOutcome = Result<AuditReport, AuditError>;

/// JSON shape of an [`AuditOutcome`]: the report itself, or `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AuditResponse {
    Report(AuditReport),
    Error { error: AuditError },
}

impl From<AuditOutcome> for AuditResponse {
    fn from(outcome: AuditOutcome) -> Self {
        match outcome {
            Ok(report) => AuditResponse::Report(report),
            Err(error) => AuditResponse::Error { error },
        }
    }
}

// --- Analysis ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// A single issue derived from a report, keyed into the knowledge base by `code`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisFinding {
    pub severity: Severity,
    pub code: String,
}

impl AnalysisFinding {
    pub fn new(severity: Severity, code: &str) -> Self {
        Self { severity, code: code.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ValidationError;
    use serde_json::json;

    fn sample_report() -> AuditReport {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Security-Policy".to_string(), "Missing".to_string());
        headers.insert("X-Frame-Options".to_string(), "DENY".to_string());
        AuditReport {
            url: "http://example.com".to_string(),
            scanned_at: Utc::now(),
            https: false,
            headers: HeaderFindings::Observed(headers),
            open_ports: vec![80],
            cloud_storage_exposure: false,
            report_path: None,
        }
    }

    #[test]
    fn report_serializes_core_fields_without_report_path() {
        let value = serde_json::to_value(sample_report()).unwrap();
        let object = value.as_object().unwrap();
        for key in ["url", "scanned_at", "https", "headers", "open_ports", "cloud_storage_exposure"] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(!object.contains_key("report_path"));
        assert!(!object.contains_key("error"));
        assert_eq!(value["headers"]["X-Frame-Options"], "DENY");
    }

    #[test]
    fn failed_headers_serialize_as_single_error_field() {
        let mut report = sample_report();
        report.headers = HeaderFindings::Failed { error: HeaderProbeError::ConnectionError };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value["headers"],
            json!({"error": "Connection error - unable to reach the server"})
        );
    }

    #[test]
    fn error_outcome_serializes_as_error_object() {
        let response = AuditResponse::from(Err(AuditError::from(ValidationError::EmptyInput)));
        assert_eq!(serde_json::to_value(response).unwrap(), json!({"error": "URL is required"}));
    }

    #[test]
    fn header_lookup_is_none_when_probe_failed() {
        let findings = HeaderFindings::Failed { error: HeaderProbeError::Timeout };
        assert_eq!(findings.get("X-Frame-Options"), None);
        assert_eq!(findings.error(), Some(&HeaderProbeError::Timeout));
    }
}
