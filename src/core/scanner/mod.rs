// src/core/scanner/mod.rs

// Each probe contributes one field to the report. The orchestrator below
// validates the input, dispatches the probes and joins them.
pub mod cloud_scanner;
pub mod headers_scanner;
pub mod ports_scanner;
pub mod scheme_scanner;

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::config::AuditConfig;
use crate::core::errors::AuditError;
use crate::core::models::{AuditOutcome, AuditReport};
use crate::core::validator::validate;
use self::cloud_scanner::detect_cloud_storage;
use self::headers_scanner::run_headers_scan;
use self::ports_scanner::run_ports_scan;
use self::scheme_scanner::is_https;

/// Runs audits against a fixed configuration.
///
/// Holds nothing but immutable settings, so one instance can be cloned into
/// any number of concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Auditor {
    config: Arc<AuditConfig>,
}

impl Auditor {
    pub fn new(config: AuditConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audits one URL and returns either a full report or a terminal error.
    ///
    /// Validation failures return before any network access. The header probe
    /// and the port probe run as separate tasks and are joined before the
    /// report is assembled; the scheme and storage checks are pure. A probe
    /// task that dies is reported as `Audit failed: ...` instead of unwinding
    /// into the caller.
    #[instrument(skip(self))]
    pub async fn perform_full_audit(&self, url: &str) -> AuditOutcome {
        let scanned_at = Utc::now();

        let target = validate(url).map_err(|e| {
            info!(reason = %e, "Rejected audit input.");
            AuditError::from(e)
        })?;
        info!(host = target.host(), "Starting full audit.");

        let headers_task = {
            let url = url.to_string();
            let config = Arc::clone(&self.config);
            tokio::spawn(async move { run_headers_scan(&url, &config).await })
        };
        let ports_task = {
            let hostname = target.hostname().to_string();
            let config = Arc::clone(&self.config);
            tokio::spawn(async move { run_ports_scan(&hostname, &config.ports, config.port_timeout).await })
        };

        let https = is_https(url);
        let cloud_storage_exposure = detect_cloud_storage(url, &self.config.cloud_indicators);

        let (headers, open_ports) = tokio::join!(headers_task, ports_task);
        let headers = headers.map_err(|e| {
            error!(error = %e, "Header probe task did not complete.");
            AuditError::Failed(format!("header probe aborted: {e}"))
        })?;
        let open_ports = open_ports.map_err(|e| {
            error!(error = %e, "Port probe task did not complete.");
            AuditError::Failed(format!("port probe aborted: {e}"))
        })?;

        info!(https, open_ports = ?open_ports, cloud_storage_exposure, "Full audit finished.");
        Ok(AuditReport {
            url: url.to_string(),
            scanned_at,
            https,
            headers,
            open_ports,
            cloud_storage_exposure,
            report_path: None,
        })
    }
}

/// Audits `url` with the default configuration.
pub async fn perform_full_audit(url: &str) -> AuditOutcome {
    Auditor::default().perform_full_audit(url).await
}
