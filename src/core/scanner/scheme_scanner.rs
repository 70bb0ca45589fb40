// src/core/scanner/scheme_scanner.rs

const HTTPS_PREFIX: &str = "https://";

/// Reports whether the URL declares the `https` scheme.
///
/// Case-sensitive: `HTTPS://example.com` is reported as not secure.
pub fn is_https(url: &str) -> bool {
    url.starts_with(HTTPS_PREFIX)
}
