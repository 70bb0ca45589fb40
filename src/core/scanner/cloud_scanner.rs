// src/core/scanner/cloud_scanner.rs

use tracing::debug;

/// Flags URLs that literally reference a public cloud-storage endpoint.
///
/// Plain substring match over the whole URL text, query string included. A
/// bucket hidden behind a custom domain is not detected.
pub fn detect_cloud_storage<S: AsRef<str>>(url: &str, indicators: &[S]) -> bool {
    let hit = indicators.iter().map(AsRef::<str>::as_ref).find(|indicator| url.contains(*indicator));
    if let Some(indicator) = hit {
        debug!(url, indicator, "Cloud storage indicator matched.");
    }
    hit.is_some()
}
