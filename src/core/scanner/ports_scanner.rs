// src/core/scanner/ports_scanner.rs

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Attempts one TCP connection to `host:port`, bounded by `limit`.
///
/// Name resolution counts against the same budget. Every failure mode means
/// the port is treated as closed.
async fn probe_port(host: String, port: u16, limit: Duration) -> bool {
    match timeout(limit, TcpStream::connect((host.as_str(), port))).await {
        Ok(Ok(_stream)) => {
            debug!(host = %host, port, "Port open.");
            true
        }
        Ok(Err(e)) => {
            debug!(host = %host, port, error = %e, "Port closed.");
            false
        }
        Err(_elapsed) => {
            debug!(host = %host, port, "Port probe timed out.");
            false
        }
    }
}

/// Probes every port concurrently and returns the open ones in probe order.
///
/// Each attempt runs on its own task so a filtered port only costs its own
/// timeout. Closed ports are omitted, never reported as errors.
pub async fn run_ports_scan(host: &str, ports: &[u16], limit: Duration) -> Vec<u16> {
    info!(host, ports = ?ports, "Starting ports scan.");

    let handles: Vec<(u16, JoinHandle<bool>)> = ports
        .iter()
        .map(|&port| (port, tokio::spawn(probe_port(host.to_string(), port, limit))))
        .collect();

    let mut open_ports = Vec::with_capacity(handles.len());
    for (port, handle) in handles {
        match handle.await {
            Ok(true) => open_ports.push(port),
            Ok(false) => {}
            Err(e) => warn!(port, error = %e, "Port probe task failed, treating port as closed."),
        }
    }

    info!(host, open = ?open_ports, "Ports scan finished.");
    open_ports
}
