//! Static security heuristics for generated snippets.
//!
//! These are shallow lexical checks, not semantic analysis: each rule
//! looks for a risky marker and the absence of the mitigating WordPress
//! API calls. False positives and negatives are expected and acceptable;
//! the scan exists to annotate artifacts, not to gate them.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of scanning one generated snippet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// True iff no issues fired
    pub pass: bool,
    /// Human-readable issue descriptions, one per fired rule
    pub issues: Vec<String>,
}

/// Scan a snippet for common WordPress security mistakes.
///
/// Rules are evaluated independently; multiple issues may fire for the
/// same snippet. Deterministic and side-effect free.
pub fn scan(code: &str) -> ScanReport {
    let mut issues = Vec::new();

    // Raw POST handling without nonce verification
    if code.contains("$_POST")
        && !code.contains("check_admin_referer")
        && !code.contains("wp_verify_nonce")
    {
        issues.push("Potential CSRF: Missing Nonce validation on POST data.".to_string());
    }

    // Echoed output without any escaping helper
    if code.contains("echo")
        && !code.contains("esc_html")
        && !code.contains("esc_attr")
        && !code.contains("esc_url")
    {
        issues.push("Potential XSS: Unescaped output found.".to_string());
    }

    // Raw queries without prepare()
    if code.contains("$wpdb->query") && !code.contains("$wpdb->prepare") {
        issues.push("SQL Injection Risk: Use $wpdb->prepare() for queries.".to_string());
    }

    if !issues.is_empty() {
        debug!(count = issues.len(), "security heuristics flagged snippet");
    }

    ScanReport {
        pass: issues.is_empty(),
        issues,
    }
}
