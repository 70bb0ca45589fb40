// src/core/scanner/headers_scanner.rs

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use tracing::{debug, error, info, warn};

use crate::config::{AuditConfig, MISSING_HEADER};
use crate::core::errors::HeaderProbeError;
use crate::core::models::HeaderFindings;

const MAX_REDIRECTS: usize = 30;

/// Reads a header from the response, joining repeated values with `", "`.
///
/// Returns the `"Missing"` sentinel when the header is absent.
fn check_header(headers: &HeaderMap, name: &str) -> String {
    debug!(header_name = name, "Checking for header.");
    let values: Vec<String> = headers
        .get_all(name)
        .iter()
        .map(|value| match value.to_str() {
            Ok(s) => s.to_string(),
            Err(_) => {
                warn!(header_name = name, "Header found but contained non-ASCII bytes.");
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            }
        })
        .collect();

    if values.is_empty() {
        debug!(header_name = name, "Header not found.");
        MISSING_HEADER.to_string()
    } else {
        debug!(header_name = name, count = values.len(), "Header found.");
        values.join(", ")
    }
}

/// Issues one GET against `url` and records each required header.
///
/// Up to 30 redirects are followed and the whole exchange is bounded by
/// `config.header_timeout`. Transport failures come back as
/// [`HeaderFindings::Failed`] rather than as an error, so the caller can still
/// assemble a report.
pub async fn run_headers_scan(url: &str, config: &AuditConfig) -> HeaderFindings {
    info!(url, "Starting headers scan.");

    let client = match reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.header_timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client for headers scan.");
            return HeaderFindings::Failed {
                error: HeaderProbeError::RequestFailed(e.to_string()),
            };
        }
    };

    match client.get(url).send().await {
        Ok(response) => {
            info!(status = %response.status(), final_url = %response.url(), "Received HTTP response for headers scan.");
            let headers = response.headers();
            let observed: BTreeMap<String, String> = config
                .required_headers
                .iter()
                .map(|name| (name.clone(), check_header(headers, name)))
                .collect();
            info!(checked = observed.len(), "Headers scan finished.");
            HeaderFindings::Observed(observed)
        }
        Err(e) => {
            let error = HeaderProbeError::from_transport(&e);
            error!(url, error = %e, kind = %error, "HTTP request failed for headers scan.");
            HeaderFindings::Failed { error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn records_present_headers_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Security-Policy", "default-src 'self'")
                    .insert_header("X-Frame-Options", "SAMEORIGIN"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let findings = run_headers_scan(&server.uri(), &AuditConfig::default()).await;

        assert_eq!(findings.get("Content-Security-Policy"), Some("default-src 'self'"));
        assert_eq!(findings.get("X-Frame-Options"), Some("SAMEORIGIN"));
    }

    #[tokio::test]
    async fn absent_headers_use_missing_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let findings = run_headers_scan(&server.uri(), &AuditConfig::default()).await;

        match findings {
            HeaderFindings::Observed(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(map["Content-Security-Policy"], "Missing");
                assert_eq!(map["X-Frame-Options"], "Missing");
            }
            other => panic!("expected observed headers, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_still_reports_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).insert_header("X-Frame-Options", "DENY"))
            .mount(&server)
            .await;

        let findings = run_headers_scan(&server.uri(), &AuditConfig::default()).await;

        assert_eq!(findings.get("X-Frame-Options"), Some("DENY"));
        assert_eq!(findings.get("Content-Security-Policy"), Some("Missing"));
    }

    #[tokio::test]
    async fn follows_redirects_to_final_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/start"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/final"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/final"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Security-Policy", "frame-ancestors 'none'"))
            .mount(&server)
            .await;

        let url = format!("{}/start", server.uri());
        let findings = run_headers_scan(&url, &AuditConfig::default()).await;

        assert_eq!(findings.get("Content-Security-Policy"), Some("frame-ancestors 'none'"));
    }

    #[tokio::test]
    async fn long_redirect_chain_is_followed() {
        let server = MockServer::start().await;
        for hop in 0..25 {
            Mock::given(method("GET"))
                .and(path(format!("/hop/{hop}")))
                .respond_with(ResponseTemplate::new(302).insert_header("Location", format!("/hop/{}", hop + 1)))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/hop/25"))
            .respond_with(ResponseTemplate::new(200).insert_header("X-Frame-Options", "DENY"))
            .mount(&server)
            .await;

        let url = format!("{}/hop/0", server.uri());
        let findings = run_headers_scan(&url, &AuditConfig::default()).await;

        assert_eq!(findings.get("X-Frame-Options"), Some("DENY"));
    }

    #[tokio::test]
    async fn slow_server_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let config = AuditConfig::default().with_header_timeout(Duration::from_millis(200));
        let findings = run_headers_scan(&server.uri(), &config).await;

        assert_eq!(findings.error(), Some(&HeaderProbeError::Timeout));
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let findings = run_headers_scan(&format!("http://{addr}/"), &AuditConfig::default()).await;

        assert_eq!(findings.error(), Some(&HeaderProbeError::ConnectionError));
    }

    #[tokio::test]
    async fn unsupported_scheme_is_a_generic_failure() {
        let findings = run_headers_scan("ftp://127.0.0.1/", &AuditConfig::default()).await;

        assert!(matches!(findings.error(), Some(HeaderProbeError::RequestFailed(_))));
    }
}
