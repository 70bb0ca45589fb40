//! Static, read-only database of every finding the analysis can emit,
//! with human-readable explanations and remediation steps.

use crate::core::models::Severity;
use std::fmt;

/// High-level grouping used to label findings in the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    /// Scheme of the audited URL.
    Transport,
    /// HTTP security headers.
    Http,
    /// Reachable TCP services.
    Network,
    /// Public cloud object storage.
    Storage,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FindingCategory::Transport => "Transport Security",
            FindingCategory::Http => "Response Headers",
            FindingCategory::Network => "Exposed Services",
            FindingCategory::Storage => "Cloud Storage",
        };
        f.write_str(label)
    }
}

impl FindingCategory {
    /// Short tag shown in front of finding titles.
    pub fn tag(&self) -> &'static str {
        match self {
            FindingCategory::Transport => "[TLS] ",
            FindingCategory::Http => "[HTTP] ",
            FindingCategory::Network => "[PORT] ",
            FindingCategory::Storage => "[CLOUD] ",
        }
    }
}

pub struct FindingDetail {
    /// Machine-readable identifier, e.g. "HEADERS_CSP_MISSING".
    pub code: &'static str,
    pub title: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    /// What the finding means and why it matters.
    pub description: &'static str,
    /// Actionable steps to fix it.
    pub remediation: &'static str,
}

static FINDINGS: &[FindingDetail] = &[
    // --- Transport ---
    FindingDetail {
        code: "TRANSPORT_HTTPS_MISSING",
        title: "Site Not Served Over HTTPS",
        category: FindingCategory::Transport,
        severity: Severity::Critical,
        description: "The audited URL does not use the 'https://' scheme. Traffic to it travels unencrypted and can be read or modified by anyone on the network path. Note that the check is case-sensitive: 'HTTPS://' is also reported here.",
        remediation: "Serve the site over HTTPS with a valid certificate and redirect every plain HTTP request to its HTTPS equivalent."
    },

    // --- HTTP headers ---
    FindingDetail {
        code: "HEADERS_REQUEST_FAILED",
        title: "Page Could Not Be Fetched",
        category: FindingCategory::Http,
        severity: Severity::Critical,
        description: "The GET request used to read response headers never produced a response, so neither header could be checked. The summary panel shows whether it timed out or was refused.",
        remediation: "Confirm the site answers from outside your network within ten seconds. Look at firewall rules, DNS records and load balancer health before auditing again."
    },
    FindingDetail {
        code: "HEADERS_CSP_MISSING",
        title: "No Content-Security-Policy",
        category: FindingCategory::Http,
        severity: Severity::Warning,
        description: "The response carries no Content-Security-Policy header. Without one the browser will run any script injected into the page, which turns a single XSS bug into full account takeover.",
        remediation: "Send a Content-Security-Policy header listing the origins allowed to serve scripts and styles. 'Content-Security-Policy-Report-Only' lets you trial a policy before enforcing it."
    },
    FindingDetail {
        code: "HEADERS_X_FRAME_OPTIONS_MISSING",
        title: "No X-Frame-Options",
        category: FindingCategory::Http,
        severity: Severity::Warning,
        description: "The response carries no X-Frame-Options header, so any other site may embed these pages in a frame. Hidden frames are the basis of clickjacking.",
        remediation: "Send 'X-Frame-Options: DENY', or 'SAMEORIGIN' if the site frames its own pages. A 'frame-ancestors' CSP directive does the same job in modern browsers."
    },

    // --- Network ---
    FindingDetail {
        code: "PORT_FTP_OPEN",
        title: "FTP Port Reachable",
        category: FindingCategory::Network,
        severity: Severity::Critical,
        description: "TCP port 21 accepts connections. FTP sends credentials and data in clear text and is a frequent target for brute-force and anonymous-login abuse.",
        remediation: "Close port 21 at the firewall. If file transfer is needed, use SFTP or FTPS instead."
    },
    FindingDetail {
        code: "PORT_SSH_OPEN",
        title: "SSH Port Reachable",
        category: FindingCategory::Network,
        severity: Severity::Warning,
        description: "TCP port 22 accepts connections from the internet. An exposed SSH daemon attracts constant credential-stuffing attempts.",
        remediation: "Restrict port 22 to known addresses or a VPN, disable password authentication and rely on key-based logins."
    },
    FindingDetail {
        code: "PORT_HTTP_OPEN",
        title: "Plain HTTP Port Reachable",
        category: FindingCategory::Network,
        severity: Severity::Info,
        description: "TCP port 80 accepts connections. This is normal when it only redirects to HTTPS, but any content served there is unencrypted.",
        remediation: "Make sure everything on port 80 answers with a permanent redirect to HTTPS and consider enabling HSTS."
    },

    // --- Storage ---
    FindingDetail {
        code: "CLOUD_STORAGE_EXPOSED",
        title: "Public Cloud Storage Referenced",
        category: FindingCategory::Storage,
        severity: Severity::Warning,
        description: "The URL points at a public cloud object-storage endpoint (Amazon S3, Google Cloud Storage or Azure Blob Storage). Misconfigured buckets are a common source of data leaks.",
        remediation: "Review the bucket's access policy, block public listing, and serve public assets through a CDN or signed URLs instead of raw bucket endpoints."
    },
];

/// Looks up the detail for a finding code, `None` for unknown codes.
pub fn get_finding_detail(code: &str) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|detail| detail.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        for (i, finding) in FINDINGS.iter().enumerate() {
            assert!(
                FINDINGS[i + 1..].iter().all(|other| other.code != finding.code),
                "duplicate code {}",
                finding.code
            );
        }
    }

    #[test]
    fn unknown_code_has_no_detail() {
        assert!(get_finding_detail("DNS_DMARC_MISSING").is_none());
        assert_eq!(get_finding_detail("PORT_FTP_OPEN").unwrap().category, FindingCategory::Network);
    }
}
