// src/core/analysis.rs

use tracing::debug;

use crate::config::MISSING_HEADER;
use crate::core::models::{AnalysisFinding, AuditReport, HeaderFindings, Severity};

/// Header name to the finding raised when it is missing.
const HEADER_FINDINGS: &[(&str, &str)] = &[
    ("Content-Security-Policy", "HEADERS_CSP_MISSING"),
    ("X-Frame-Options", "HEADERS_X_FRAME_OPTIONS_MISSING"),
];

const PORT_FINDINGS: &[(u16, Severity, &str)] = &[
    (21, Severity::Critical, "PORT_FTP_OPEN"),
    (22, Severity::Warning, "PORT_SSH_OPEN"),
    (80, Severity::Info, "PORT_HTTP_OPEN"),
];

/// Derives security findings from a finished report.
///
/// The report itself is left untouched; findings are a separate view used
/// for scoring and display.
pub fn analyze(report: &AuditReport) -> Vec<AnalysisFinding> {
    let mut analyses = Vec::new();

    if !report.https {
        analyses.push(AnalysisFinding::new(Severity::Critical, "TRANSPORT_HTTPS_MISSING"));
    }

    match &report.headers {
        HeaderFindings::Failed { error } => {
            debug!(error = %error, "Header probe failed, adding HEADERS_REQUEST_FAILED finding.");
            analyses.push(AnalysisFinding::new(Severity::Critical, "HEADERS_REQUEST_FAILED"));
        }
        HeaderFindings::Observed(map) => {
            for (name, code) in HEADER_FINDINGS {
                if map.get(*name).is_some_and(|value| value == MISSING_HEADER) {
                    analyses.push(AnalysisFinding::new(Severity::Warning, code));
                }
            }
        }
    }

    for (port, severity, code) in PORT_FINDINGS {
        if report.open_ports.contains(port) {
            analyses.push(AnalysisFinding::new(*severity, code));
        }
    }

    if report.cloud_storage_exposure {
        analyses.push(AnalysisFinding::new(Severity::Warning, "CLOUD_STORAGE_EXPOSED"));
    }

    debug!(count = analyses.len(), "Analysis finished.");
    analyses
}

/// Condensed view of a set of findings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub score: u8,
    pub critical_issues: usize,
    pub warning_issues: usize,
}

impl ScanSummary {
    /// Starts from 100 and subtracts 15 per critical and 5 per warning finding.
    pub fn from_findings(findings: &[AnalysisFinding]) -> Self {
        let criticals = findings.iter().filter(|f| f.severity == Severity::Critical).count();
        let warnings = findings.iter().filter(|f| f.severity == Severity::Warning).count();

        let penalty = criticals.saturating_mul(15).saturating_add(warnings.saturating_mul(5));
        let score = 100usize.saturating_sub(penalty) as u8;

        Self { score, critical_issues: criticals, warning_issues: warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::HeaderProbeError;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn report(https: bool, headers: HeaderFindings, open_ports: Vec<u16>, cloud: bool) -> AuditReport {
        AuditReport {
            url: "https://example.com".to_string(),
            scanned_at: Utc::now(),
            https,
            headers,
            open_ports,
            cloud_storage_exposure: cloud,
            report_path: None,
        }
    }

    fn headers(csp: &str, xfo: &str) -> HeaderFindings {
        let mut map = BTreeMap::new();
        map.insert("Content-Security-Policy".to_string(), csp.to_string());
        map.insert("X-Frame-Options".to_string(), xfo.to_string());
        HeaderFindings::Observed(map)
    }

    fn codes(findings: &[AnalysisFinding]) -> Vec<&str> {
        findings.iter().map(|f| f.code.as_str()).collect()
    }

    #[test]
    fn hardened_site_has_no_findings() {
        let findings = analyze(&report(true, headers("default-src 'self'", "DENY"), vec![443], false));
        assert!(findings.is_empty());
        assert_eq!(ScanSummary::from_findings(&findings).score, 100);
    }

    #[test]
    fn missing_headers_and_open_services_are_flagged() {
        let findings = analyze(&report(false, headers("Missing", "Missing"), vec![80, 21, 22], true));
        assert_eq!(
            codes(&findings),
            vec![
                "TRANSPORT_HTTPS_MISSING",
                "HEADERS_CSP_MISSING",
                "HEADERS_X_FRAME_OPTIONS_MISSING",
                "PORT_FTP_OPEN",
                "PORT_SSH_OPEN",
                "PORT_HTTP_OPEN",
                "CLOUD_STORAGE_EXPOSED",
            ]
        );
    }

    #[test]
    fn failed_header_probe_is_one_critical_finding() {
        let failed = HeaderFindings::Failed { error: HeaderProbeError::Timeout };
        let findings = analyze(&report(true, failed, vec![], false));
        assert_eq!(codes(&findings), vec!["HEADERS_REQUEST_FAILED"]);
    }

    #[test]
    fn score_never_underflows() {
        let findings = vec![AnalysisFinding::new(Severity::Critical, "X"); 10];
        let summary = ScanSummary::from_findings(&findings);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.critical_issues, 10);
    }
}
