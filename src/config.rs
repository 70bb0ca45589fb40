// src/config.rs

//! Runtime configuration for the audit engine and the service layer.
//!
//! The fixed probe inputs (port list, required headers, storage indicators)
//! live here as named constants so probes never hard-code them.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::logging::get_data_dir;

/// Ports probed for reachability, in probe order.
pub const DEFAULT_PORTS: [u16; 4] = [80, 443, 21, 22];

/// Response headers every audited site is expected to send.
pub const REQUIRED_HEADERS: [&str; 2] = ["Content-Security-Policy", "X-Frame-Options"];

/// Hostname fragments of public cloud object storage.
pub const CLOUD_STORAGE_INDICATORS: [&str; 3] = [
    "s3.amazonaws.com",
    "storage.googleapis.com",
    "blob.core.windows.net",
];

/// Sentinel recorded for a required header absent from the response.
pub const MISSING_HEADER: &str = "Missing";

pub const HEADER_TIMEOUT: Duration = Duration::from_secs(10);
pub const PORT_TIMEOUT: Duration = Duration::from_secs(3);

pub const REQUESTS_TOPIC: &str = "security-audit-portal";
pub const REPORTS_TOPIC: &str = "security-audit-reports";

/// Settings consumed by [`crate::core::scanner::Auditor`].
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub ports: Vec<u16>,
    pub required_headers: Vec<String>,
    pub cloud_indicators: Vec<String>,
    pub header_timeout: Duration,
    pub port_timeout: Duration,
    pub user_agent: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
            required_headers: REQUIRED_HEADERS.iter().map(|h| h.to_string()).collect(),
            cloud_indicators: CLOUD_STORAGE_INDICATORS.iter().map(|i| i.to_string()).collect(),
            header_timeout: HEADER_TIMEOUT,
            port_timeout: PORT_TIMEOUT,
            user_agent: format!("VanguardAudit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AuditConfig {
    pub fn with_ports(mut self, ports: impl Into<Vec<u16>>) -> Self {
        self.ports = ports.into();
        self
    }

    pub fn with_header_timeout(mut self, timeout: Duration) -> Self {
        self.header_timeout = timeout;
        self
    }

    pub fn with_port_timeout(mut self, timeout: Duration) -> Self {
        self.port_timeout = timeout;
        self
    }
}

/// Settings for the HTTP front door, the bus and the report store.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub report_dir: PathBuf,
    pub persist_reports: bool,
    pub requests_topic: String,
    pub reports_topic: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            report_dir: default_report_dir(),
            persist_reports: true,
            requests_topic: REQUESTS_TOPIC.to_string(),
            reports_topic: REPORTS_TOPIC.to_string(),
        }
    }
}

/// Reports land next to the log file unless told otherwise.
pub fn default_report_dir() -> PathBuf {
    get_data_dir()
}
